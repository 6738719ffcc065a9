use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use flexdesigner_core::config::AppConfig;

use crate::error::PageError;

/// Bounds for the two waits of an apply attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub editor_timeout: Duration,
    pub editor_interval: Duration,
    pub apply_timeout: Duration,
    pub apply_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            editor_timeout: Duration::from_millis(4000),
            editor_interval: Duration::from_millis(150),
            apply_timeout: Duration::from_millis(2000),
            apply_interval: Duration::from_millis(120),
        }
    }
}

impl Timing {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            editor_timeout: Duration::from_millis(config.editor_timeout_ms),
            editor_interval: Duration::from_millis(config.editor_interval_ms.max(1)),
            apply_timeout: Duration::from_millis(config.apply_timeout_ms),
            apply_interval: Duration::from_millis(config.apply_interval_ms.max(1)),
        }
    }
}

/// Re-runs `probe` every `interval` until it yields a value or `timeout` has passed.
///
/// The first probe runs one interval after the call. `Ok(None)` is returned from the first
/// empty probe that finds the elapsed time past `timeout`, so a miss never resolves early.
pub async fn wait_for<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Result<Option<T>, PageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, PageError>>,
{
    let start = Instant::now();
    loop {
        sleep(interval).await;
        if let Some(found) = probe().await? {
            return Ok(Some(found));
        }
        if start.elapsed() > timeout {
            return Ok(None);
        }
    }
}
