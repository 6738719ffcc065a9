pub mod launcher;
pub mod session;

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tracing::{error, info};

use flexdesigner_core::config::AppConfig;

use self::launcher::BrowserType;
use self::session::SessionManager;
use crate::cdp::CdpPage;

/// A connected browser whose event handler runs in the background.
pub struct SimulatorBrowser {
    pub browser: Browser,
}

impl SimulatorBrowser {
    pub fn session_manager_for(config: &AppConfig) -> SessionManager {
        let preferred = config.browser.as_deref().and_then(|name| match name.parse::<BrowserType>() {
            Ok(b) => Some(b),
            Err(e) => {
                tracing::warn!("Ignoring configured browser: {}", e);
                None
            }
        });
        SessionManager::new(preferred, config.cdp_port, config.headless)
    }

    /// Connects to the session browser, launching it on the simulator if needed.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let session_manager = Self::session_manager_for(config);
        let (browser, mut handler) = session_manager.get_or_create_session(&config.simulator_url).await?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!("Browser handler error: {}", e);
                    break;
                }
            }
        });

        Ok(Self { browser })
    }

    /// A tab already showing `simulator_url`, or a new one opened on it.
    pub async fn open_simulator(&self, simulator_url: &str) -> anyhow::Result<CdpPage> {
        let prefix = simulator_url.trim_end_matches('/');
        for page in self.browser.pages().await? {
            if let Ok(Some(url)) = page.url().await {
                if url.starts_with(prefix) {
                    info!("Using open simulator tab {}", url);
                    return Ok(CdpPage::new(page));
                }
            }
        }

        info!("Opening simulator at {}", simulator_url);
        let page: Page = self.browser.new_page(simulator_url).await?;
        page.wait_for_navigation().await?;
        Ok(CdpPage::new(page))
    }
}
