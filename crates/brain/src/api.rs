use crate::{FlexGenerator, GenerateError, Message};
use tracing::warn;

impl FlexGenerator {
    /// Chat-completion call with retry logic (exponential backoff)
    pub(crate) async fn complete(&self, api_key: &str, messages: &[Message]) -> Result<String, GenerateError> {
        let config = &self.state.config;
        let body = serde_json::json!({
            "model": config.model,
            "temperature": config.temperature,
            "messages": messages,
        });

        // Retry logic: 3 attempts with exponential backoff
        let mut attempts = 0;
        let max_attempts = 3;

        loop {
            attempts += 1;

            let res = self
                .client
                .post(&config.api_url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await?;

            let status = res.status();

            if status.is_success() {
                let json: serde_json::Value = res.json().await?;
                let content = json["choices"][0]["message"]["content"].as_str().unwrap_or("");
                if content.is_empty() {
                    return Err(GenerateError::EmptyContent);
                }
                return Ok(content.to_string());
            }

            // Handle retryable errors (429 Too Many Requests, 500+ Server Errors)
            if (status.as_u16() == 429 || status.is_server_error()) && attempts < max_attempts {
                let backoff = self.retry_base * 2u32.pow(attempts - 1);
                warn!("⚠️ API Error {}, retrying in {:?} (attempt {}/{})", status, backoff, attempts, max_attempts);
                tokio::time::sleep(backoff).await;
                continue;
            }

            let payload: Option<serde_json::Value> = res.json().await.ok();
            let message = payload
                .as_ref()
                .and_then(|p| p["error"]["message"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            return Err(GenerateError::Api { status: status.as_u16(), message });
        }
    }
}
