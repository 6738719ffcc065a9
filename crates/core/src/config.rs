use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SIMULATOR_URL: &str = "https://developers.line.biz/flex-simulator/";

/// Environment keys are matched lowercased, so `OPENAI_API_KEY` fills `openai_api_key`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,

    #[serde(alias = "openai_model")]
    pub model: String,

    pub temperature: f64,

    #[serde(alias = "openai_api_url")]
    pub api_url: String,

    #[serde(alias = "flex_simulator_url")]
    pub simulator_url: String,

    /// Preferred browser name (chrome, chromium, edge, brave).
    pub browser: Option<String>,

    pub cdp_port: u16,
    pub headless: bool,

    pub editor_timeout_ms: u64,
    pub editor_interval_ms: u64,
    pub apply_timeout_ms: u64,
    pub apply_interval_ms: u64,

    #[serde(skip)]
    pub project_root: std::path::PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let root = crate::path_utils::get_app_root();

        // 1. Try standard dotenv discovery from current dir
        if dotenvy::dotenv().is_err() {
            // 2. Fallback: the app root
            let path = root.join(".env");
            if path.exists() {
                let _ = dotenvy::from_path(&path);
            }
        }

        Self::load_from(&root)
    }

    /// Layers defaults, `<root>/flexdesigner.*`, `./flexdesigner.*` and the environment.
    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        let root_file = root.join("flexdesigner");
        let builder = Config::builder()
            .set_default("model", DEFAULT_MODEL)?
            .set_default("temperature", 0.7)?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("simulator_url", DEFAULT_SIMULATOR_URL)?
            .set_default("cdp_port", 9222_i64)?
            .set_default("headless", false)?
            .set_default("editor_timeout_ms", 4000_i64)?
            .set_default("editor_interval_ms", 150_i64)?
            .set_default("apply_timeout_ms", 2000_i64)?
            .set_default("apply_interval_ms", 120_i64)?
            .add_source(File::with_name(&root_file.to_string_lossy()).required(false))
            .add_source(File::with_name("flexdesigner").required(false))
            .add_source(Environment::default());

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.project_root = root.to_path_buf();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_uses_root_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("flexdesigner.toml"),
            "cdp_port = 9333\neditor_timeout_ms = 6000\nbrowser = \"brave\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.cdp_port, 9333);
        assert_eq!(config.editor_timeout_ms, 6000);
        assert_eq!(config.editor_interval_ms, 150);
        assert_eq!(config.browser.as_deref(), Some("brave"));
        assert_eq!(config.project_root, dir.path());
    }

    #[test]
    fn test_load_from_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.apply_timeout_ms, 2000);
        assert_eq!(config.apply_interval_ms, 120);
        assert_eq!(config.simulator_url, DEFAULT_SIMULATOR_URL);
    }
}
