//! Local key/value store backed by a single JSON file in the app root.
//!
//! Holds the chat-completion API key and the most recently generated template.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const API_KEY_KEY: &str = "openaiApiKey";
pub const TEMPLATE_KEY: &str = "flexTemplate";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("the API key format looks wrong (expected it to start with \"sk-\")")]
    InvalidApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySaveOutcome {
    Saved,
    /// Input was blank, so the stored key was removed.
    Cleared,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store at `<app root>/storage.json`.
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value);
        self.persist(&map)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .get(API_KEY_KEY)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|k| !k.is_empty()))
    }

    pub fn save_api_key(&self, raw: &str) -> Result<KeySaveOutcome, StoreError> {
        let value = raw.trim();
        if value.is_empty() {
            self.remove(API_KEY_KEY)?;
            info!("API key cleared");
            return Ok(KeySaveOutcome::Cleared);
        }
        if !value.starts_with("sk-") {
            return Err(StoreError::InvalidApiKey);
        }
        self.set(API_KEY_KEY, Value::String(value.to_string()))?;
        info!("API key saved");
        Ok(KeySaveOutcome::Saved)
    }

    pub fn template(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.get(TEMPLATE_KEY)?.filter(|v| !v.is_null()))
    }

    pub fn save_template(&self, template: &Value) -> Result<(), StoreError> {
        self.set(TEMPLATE_KEY, template.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_root(dir.path());
        assert_eq!(store.api_key().unwrap(), None);
        assert_eq!(store.template().unwrap(), None);
    }

    #[test]
    fn test_save_api_key_rules() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_root(dir.path());

        assert!(matches!(store.save_api_key("pk-nope"), Err(StoreError::InvalidApiKey)));
        assert_eq!(store.api_key().unwrap(), None);

        assert_eq!(store.save_api_key("  sk-abc  ").unwrap(), KeySaveOutcome::Saved);
        assert_eq!(store.api_key().unwrap().as_deref(), Some("sk-abc"));

        assert_eq!(store.save_api_key("   ").unwrap(), KeySaveOutcome::Cleared);
        assert_eq!(store.api_key().unwrap(), None);
    }

    #[test]
    fn test_template_survives_key_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_root(dir.path());
        let template = json!({"type": "bubble", "body": {"type": "box"}});

        store.save_template(&template).unwrap();
        store.save_api_key("sk-1").unwrap();
        store.save_api_key("").unwrap();

        assert_eq!(store.template().unwrap(), Some(template));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::in_root(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.api_key(), Err(StoreError::Corrupt(_))));
    }
}
