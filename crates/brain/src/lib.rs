//! Flex Designer Brain - Flex Message generation
//!
//! This module is organized into:
//! - api: chat-completion communication with retry logic
//! - prompt: request message construction
//! - normalize: code-fence stripping and JSON parsing of replies

mod api;
mod normalize;
mod prompt;

pub use normalize::{normalize_reply, strip_code_fences};
pub use prompt::{build_messages, DEFAULT_INSTRUCTION, SYSTEM_PROMPT};

use flexdesigner_core::state::AppState;
use flexdesigner_core::store::StoreError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No API key is stored. Run `flexdesigner key set <KEY>` first.")]
    MissingApiKey,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Could not read any content from the response.")]
    EmptyContent,

    #[error("Failed to parse the JSON. Response: {preview}...")]
    InvalidJson { preview: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A generated template and its pretty-printed form.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFlex {
    pub template: serde_json::Value,
    pub pretty_json: String,
}

/// Talks to the chat-completion endpoint and persists what it produces.
#[derive(Clone)]
pub struct FlexGenerator {
    pub client: reqwest::Client,
    pub state: AppState,
    retry_base: Duration,
}

impl FlexGenerator {
    pub fn new(state: AppState) -> Self {
        Self {
            client: reqwest::Client::new(),
            state,
            retry_base: Duration::from_secs(1),
        }
    }

    /// First backoff delay; later attempts double it.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Generates a template from `prompt`, optionally refining `base_template`.
    pub async fn generate(
        &self,
        prompt: &str,
        base_template: Option<&serde_json::Value>,
    ) -> Result<GeneratedFlex, GenerateError> {
        let api_key = self.state.api_key()?.ok_or(GenerateError::MissingApiKey)?;
        let messages = build_messages(prompt, base_template);

        info!("🧠 Requesting Flex Message ({} base template)", if base_template.is_some() { "with" } else { "without" });
        let raw = self.complete(&api_key, &messages).await?;
        let template = normalize_reply(&raw)?;
        let pretty_json = serde_json::to_string_pretty(&template)
            .map_err(|_| GenerateError::InvalidJson { preview: String::new() })?;

        self.state.store.save_template(&template)?;
        Ok(GeneratedFlex { template, pretty_json })
    }
}
