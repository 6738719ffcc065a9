use crate::config::AppConfig;
use crate::store::{LocalStore, StoreError};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: LocalStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = LocalStore::in_root(&config.project_root);
        Self { config, store }
    }

    /// Stored key first, then the configured one.
    pub fn api_key(&self) -> Result<Option<String>, StoreError> {
        if let Some(key) = self.store.api_key()? {
            return Ok(Some(key));
        }
        Ok(self
            .config
            .openai_api_key
            .clone()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }
}
