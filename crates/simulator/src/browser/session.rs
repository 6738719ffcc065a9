use anyhow::{anyhow, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::handler::Handler;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::launcher::{fetch_ws_url, BrowserLauncher, BrowserType};

/// The browser a previous invocation launched, so later ones reconnect to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub cdp_port: u16,
    pub cdp_url: String,
}

pub struct SessionManager {
    sessions_dir: PathBuf,
    preferred_browser: Option<BrowserType>,
    cdp_port: u16,
    headless: bool,
}

impl SessionManager {
    pub fn new(preferred_browser: Option<BrowserType>, cdp_port: u16, headless: bool) -> Self {
        let sessions_dir = flexdesigner_core::path_utils::get_app_root().join("browser_sessions");
        Self::in_dir(sessions_dir, preferred_browser, cdp_port, headless)
    }

    pub fn in_dir(sessions_dir: PathBuf, preferred_browser: Option<BrowserType>, cdp_port: u16, headless: bool) -> Self {
        Self { sessions_dir, preferred_browser, cdp_port, headless }
    }

    fn session_file(&self) -> PathBuf {
        self.sessions_dir.join("active_session.json")
    }

    pub fn load_session_state(&self) -> Option<SessionState> {
        let content = fs::read_to_string(self.session_file()).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save_session_state(&self, state: &SessionState) -> Result<()> {
        fs::create_dir_all(&self.sessions_dir)?;
        fs::write(self.session_file(), serde_json::to_string_pretty(state)?)?;
        Ok(())
    }

    pub fn remove_session_state(&self) {
        let _ = fs::remove_file(self.session_file());
    }

    /// Reconnects to the recorded browser, or launches a new one at `start_url`.
    pub async fn get_or_create_session(&self, start_url: &str) -> Result<(Browser, Handler)> {
        if let Some(state) = self.load_session_state() {
            // The websocket URL changes when a browser restarts on the same port.
            if let Ok(ws_url) = fetch_ws_url(state.cdp_port).await {
                match Browser::connect(&ws_url).await {
                    Ok(pair) => {
                        tracing::info!("Reconnected to browser on port {}", state.cdp_port);
                        if ws_url != state.cdp_url {
                            self.save_session_state(&SessionState { cdp_port: state.cdp_port, cdp_url: ws_url })?;
                        }
                        return Ok(pair);
                    }
                    Err(e) => tracing::warn!("Recorded browser refused the connection: {}", e),
                }
            }
            tracing::info!("Dropping stale browser session");
            self.remove_session_state();
        }

        let launcher = BrowserLauncher::new(self.preferred_browser, self.cdp_port, self.headless)?;
        let (_child, cdp_url) = launcher.launch_and_wait(start_url).await?;

        self.save_session_state(&SessionState { cdp_port: self.cdp_port, cdp_url: cdp_url.clone() })?;

        Browser::connect(&cdp_url).await.map_err(|e| anyhow!("Failed to connect: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_round_trip_and_removal() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SessionManager::in_dir(dir.path().join("browser_sessions"), None, 9222, true);
        assert_eq!(manager.load_session_state(), None);

        let state = SessionState { cdp_port: 9333, cdp_url: "ws://127.0.0.1:9333/devtools/browser/x".to_string() };
        manager.save_session_state(&state).unwrap();
        assert_eq!(manager.load_session_state(), Some(state));

        manager.remove_session_state();
        assert_eq!(manager.load_session_state(), None);
    }
}
