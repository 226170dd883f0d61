use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ConciergeError, Result};
use crate::interfaces::providers::LlmProvider;

/// Local Ollama daemon behind the uniform completion surface.
/// Non-streaming `/api/generate` with the token cap passed through as
/// `num_predict`.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
        let model = model.unwrap_or_else(|| "llama2".to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            }
        });

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ConciergeError::Http(format!("ollama transport failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConciergeError::Http(format!("ollama read failed: {e}")))?;

        if !status.is_success() {
            return Err(ConciergeError::Http(format!(
                "ollama generate failed ({status}): {body}"
            )));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ConciergeError::Serialization(format!("ollama decode failed: {e}")))?;

        let text = value
            .get("response")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConciergeError::Http("ollama returned an empty response".to_string()))?;

        Ok(text)
    }
}
