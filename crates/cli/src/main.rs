use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use flexdesigner_brain::FlexGenerator;
use flexdesigner_core::config::AppConfig;
use flexdesigner_core::state::AppState;
use flexdesigner_core::store::KeySaveOutcome;
use flexdesigner_simulator::browser::SimulatorBrowser;
use flexdesigner_simulator::{apply_to_simulator, Timing};

#[derive(Parser, Debug)]
#[command(author, version, about = "Flex Designer - generate LINE Flex Messages and paste them into the simulator", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the stored chat-completion API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Generate a Flex Message and apply it to the simulator
    Generate {
        /// What the message should look like
        #[arg(index = 1)]
        prompt: String,
        /// Ignore the stored template and start from scratch
        #[arg(long)]
        fresh: bool,
        /// Only print the JSON
        #[arg(long)]
        no_apply: bool,
        /// Also write the JSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Apply Flex Message JSON from a file (or `-` for stdin) to the simulator
    Apply {
        #[arg(index = 1)]
        source: String,
    },
    /// Launch or reconnect the browser and open the simulator
    Open,
    /// Forget the persisted browser session
    Stop,
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Save a key (a blank key clears it)
    Set {
        #[arg(index = 1)]
        key: String,
    },
    /// Remove the stored key
    Clear,
    /// Show whether a key is stored
    Status,
}

fn init_logging(app_dir: &std::path::Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let _ = std::fs::create_dir_all(app_dir);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(app_dir.join("flexdesigner.log"));

    let (file_layer, guard) = match file {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_ansi(true))
        .with(file_layer)
        .init();
    guard
}

fn load_config() -> AppConfig {
    match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Error: Configuration invalid: {}", e);
            eprintln!("   Check ~/.flexdesigner/flexdesigner.toml and FLEXDESIGNER_* variables.");
            std::process::exit(1);
        }
    }
}

/// Connects to the session browser and applies `json` in the simulator tab.
async fn apply_json(config: &AppConfig, json: &str) -> anyhow::Result<()> {
    let browser = SimulatorBrowser::connect(config).await?;
    let page = browser.open_simulator(&config.simulator_url).await?;
    apply_to_simulator(&page, json, &Timing::from_config(config)).await?;
    Ok(())
}

fn read_source(source: &str) -> anyhow::Result<String> {
    let raw = if source == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))?
    };
    let value: serde_json::Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    Ok(serde_json::to_string_pretty(&value)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let app_dir = flexdesigner_core::path_utils::get_app_root();
    let _guard = init_logging(&app_dir);

    flexdesigner_core::init();

    let config = load_config();

    match args.command {
        Commands::Key { action } => {
            let state = AppState::new(config);
            match action {
                KeyAction::Set { key } => match state.store.save_api_key(&key) {
                    Ok(KeySaveOutcome::Saved) => println!("✅ API key saved."),
                    Ok(KeySaveOutcome::Cleared) => println!("🧹 API key cleared."),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                },
                KeyAction::Clear => match state.store.save_api_key("") {
                    Ok(_) => println!("🧹 API key cleared."),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                },
                KeyAction::Status => match state.store.api_key() {
                    Ok(Some(_)) => println!("🔑 API key: saved"),
                    Ok(None) => println!("🔑 API key: not saved"),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                },
            }
        }
        Commands::Generate { prompt, fresh, no_apply, output } => {
            let prompt = prompt.trim();
            if prompt.is_empty() {
                eprintln!("Please enter a request.");
                std::process::exit(1);
            }

            let state = AppState::new(config.clone());
            let base = if fresh {
                None
            } else {
                match state.store.template() {
                    Ok(t) => t,
                    Err(e) => {
                        error!("Ignoring unreadable stored template: {}", e);
                        None
                    }
                }
            };

            println!("🧠 Generating Flex Message...");
            let generated = match FlexGenerator::new(state).generate(prompt, base.as_ref()).await {
                Ok(g) => g,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };
            println!("{}", generated.pretty_json);

            if let Some(path) = output {
                if let Err(e) = std::fs::write(&path, &generated.pretty_json) {
                    eprintln!("❌ Failed to write {}: {}", path.display(), e);
                    std::process::exit(1);
                }
                info!("Wrote template to {}", path.display());
            }

            if no_apply {
                return;
            }
            match apply_json(&config, &generated.pretty_json).await {
                Ok(()) => println!("✅ Pasted the JSON into the simulator and applied it."),
                Err(e) => {
                    eprintln!("JSON was generated but automatic paste failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Apply { source } => {
            let json = match read_source(&source) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("❌ {:#}", e);
                    std::process::exit(1);
                }
            };
            match apply_json(&config, &json).await {
                Ok(()) => println!("✅ Pasted the JSON into the simulator and applied it."),
                Err(e) => {
                    eprintln!("❌ Automatic paste failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Open => {
            println!("🌐 Opening the Flex Message Simulator...");
            let opened = async {
                let browser = SimulatorBrowser::connect(&config).await?;
                browser.open_simulator(&config.simulator_url).await
            }
            .await;
            match opened {
                Ok(_) => println!("✅ Simulator ready at {}", config.simulator_url),
                Err(e) => {
                    eprintln!("❌ Failed to open the simulator: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Stop => {
            SimulatorBrowser::session_manager_for(&config).remove_session_state();
            println!("🛑 Browser session forgotten.");
        }
    }
}
