use anyhow::{anyhow, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;

/// Chromium-family browsers that speak CDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserType {
    Chrome,
    Chromium,
    Edge,
    Brave,
}

impl BrowserType {
    const ALL: [BrowserType; 4] = [BrowserType::Chrome, BrowserType::Chromium, BrowserType::Edge, BrowserType::Brave];

    pub fn name(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "Google Chrome",
            BrowserType::Chromium => "Chromium",
            BrowserType::Edge => "Microsoft Edge",
            BrowserType::Brave => "Brave",
        }
    }

    /// Executable names to look up on `PATH`.
    fn path_names(&self) -> &'static [&'static str] {
        match self {
            BrowserType::Chrome => &["google-chrome", "google-chrome-stable", "chrome"],
            BrowserType::Chromium => &["chromium", "chromium-browser"],
            BrowserType::Edge => &["microsoft-edge", "microsoft-edge-stable", "msedge"],
            BrowserType::Brave => &["brave-browser", "brave"],
        }
    }

    /// Well-known install locations, checked before `PATH`.
    fn install_paths(&self) -> &'static [&'static str] {
        #[cfg(target_os = "macos")]
        {
            match self {
                BrowserType::Chrome => &[
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                    "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                ],
                BrowserType::Chromium => &["/Applications/Chromium.app/Contents/MacOS/Chromium"],
                BrowserType::Edge => &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"],
                BrowserType::Brave => &["/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"],
            }
        }
        #[cfg(target_os = "linux")]
        {
            match self {
                BrowserType::Chrome => &["/usr/bin/google-chrome", "/usr/bin/google-chrome-stable", "/opt/google/chrome/google-chrome"],
                BrowserType::Chromium => &["/usr/bin/chromium", "/usr/bin/chromium-browser", "/snap/bin/chromium"],
                BrowserType::Edge => &["/usr/bin/microsoft-edge", "/usr/bin/microsoft-edge-stable"],
                BrowserType::Brave => &["/usr/bin/brave-browser", "/usr/bin/brave"],
            }
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            &[]
        }
    }
}

impl FromStr for BrowserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "google-chrome" => Ok(BrowserType::Chrome),
            "chromium" => Ok(BrowserType::Chromium),
            "edge" | "microsoft-edge" => Ok(BrowserType::Edge),
            "brave" | "brave-browser" => Ok(BrowserType::Brave),
            _ => Err(anyhow!("Unknown browser type: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserInfo {
    pub browser_type: BrowserType,
    pub path: PathBuf,
}

/// The preferred browser when installed, else the first one found.
pub fn discover_browser(preferred: Option<BrowserType>) -> Result<BrowserInfo> {
    let browsers = discover_all_browsers();
    tracing::info!("Found installed browsers: {:?}", browsers.iter().map(|b| b.browser_type).collect::<Vec<_>>());

    if let Some(pref) = preferred {
        if let Some(info) = browsers.iter().find(|b| b.browser_type == pref) {
            return Ok(info.clone());
        }
        tracing::warn!("Preferred browser {:?} is not installed", pref);
    }

    browsers.into_iter().next().ok_or_else(|| anyhow!("No supported browser found"))
}

pub fn discover_all_browsers() -> Vec<BrowserInfo> {
    BrowserType::ALL
        .into_iter()
        .filter_map(|browser_type| {
            let on_disk = browser_type
                .install_paths()
                .iter()
                .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
                .find(|p| p.exists());
            let path = on_disk.or_else(|| browser_type.path_names().iter().find_map(|name| which::which(name).ok()))?;
            Some(BrowserInfo { browser_type, path })
        })
        .collect()
}

/// Asks a DevTools endpoint for its browser websocket URL.
pub async fn fetch_ws_url(cdp_port: u16) -> Result<String> {
    let url = format!("http://127.0.0.1:{}/json/version", cdp_port);
    let client = reqwest::Client::builder().no_proxy().build()?;
    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        return Err(anyhow!("DevTools endpoint answered {}", resp.status()));
    }
    let json: Value = resp.json().await?;
    json.get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("DevTools endpoint has no webSocketDebuggerUrl"))
}

pub struct BrowserLauncher {
    pub browser_info: BrowserInfo,
    pub user_data_dir: PathBuf,
    pub cdp_port: u16,
    pub headless: bool,
}

impl BrowserLauncher {
    pub fn new(preferred: Option<BrowserType>, cdp_port: u16, headless: bool) -> Result<Self> {
        let browser_info = discover_browser(preferred)?;
        let user_data_dir = flexdesigner_core::path_utils::get_app_root().join("browser_profile");

        Ok(Self { browser_info, user_data_dir, cdp_port, headless })
    }

    pub fn launch(&self, start_url: &str) -> Result<Child> {
        tracing::info!("Launching {} with profile {:?}", self.browser_info.browser_type.name(), self.user_data_dir);
        std::fs::create_dir_all(&self.user_data_dir)?;

        let mut args = vec![
            format!("--remote-debugging-port={}", self.cdp_port),
            format!("--user-data-dir={}", self.user_data_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--window-size=1440,1000".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push(start_url.to_string());

        Command::new(&self.browser_info.path)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))
    }

    pub async fn wait_for_cdp(&self) -> Result<String> {
        for _ in 0..20 {
            sleep(Duration::from_millis(500)).await;
            if let Ok(ws_url) = fetch_ws_url(self.cdp_port).await {
                return Ok(ws_url);
            }
        }
        Err(anyhow!("Timeout waiting for CDP on port {}", self.cdp_port))
    }

    /// Launches and waits for DevTools. A browser that never exposes it is killed.
    pub async fn launch_and_wait(&self, start_url: &str) -> Result<(Child, String)> {
        let mut child = self.launch(start_url)?;
        let ws_url = kill_on_error(&mut child, self.wait_for_cdp().await)?;
        Ok((child, ws_url))
    }
}

fn kill_on_error<T>(child: &mut Child, result: Result<T>) -> Result<T> {
    if result.is_err() {
        tracing::warn!("Killing browser process {} that never exposed DevTools", child.id());
        if let Err(e) = child.kill() {
            tracing::warn!("Failed to kill browser process: {}", e);
        }
        let _ = child.wait();
    }
    result
}
