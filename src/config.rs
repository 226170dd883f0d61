use std::env;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::domains::directory::EventInfo;
use crate::error::{ConciergeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Openai,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatbotConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default = "default_seller_search_limit")]
    pub seller_search_limit: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            history_window: default_history_window(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            provider_timeout_secs: default_provider_timeout_secs(),
            seller_search_limit: default_seller_search_limit(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_history_window() -> usize {
    10
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_seller_search_limit() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub sqlite_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventConfig {
    pub name: String,
    pub venue: String,
    pub start_date: String,
    pub end_date: String,
}

impl EventConfig {
    pub fn to_event_info(&self) -> EventInfo {
        EventInfo {
            name: self.name.clone(),
            venue: self.venue.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "Expo".to_string(),
            venue: "Main Venue".to_string(),
            start_date: "2026-01-10".to_string(),
            end_date: "2026-01-12".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    pub primary: ProviderConfig,
    /// Fallback provider. Fallback exists only when this is present
    /// and usable; there is no hidden global toggle.
    pub secondary: Option<ProviderConfig>,
    pub storage: StorageConfig,
    #[serde(default)]
    pub event: EventConfig,
}

impl Config {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ConciergeError::Config(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ConciergeError::Config(format!("failed to read config file {path}: {e}"))
        })?;
        Self::from_json_str(&raw)
    }

    /// Local provider first, cloud second, matching the original
    /// deployment convention. The cloud fallback only materializes
    /// when an API key is present.
    pub fn convention_defaults(sqlite_path: &str) -> Self {
        let openai_key = env::var("OPENAI_API_KEY").ok().filter(|v| !v.trim().is_empty());
        Self {
            chatbot: ChatbotConfig::default(),
            primary: ProviderConfig {
                kind: ProviderKind::Ollama,
                model: Some("llama2".to_string()),
                base_url: Some("http://localhost:11434".to_string()),
                api_key: None,
            },
            secondary: openai_key.map(|key| ProviderConfig {
                kind: ProviderKind::Openai,
                model: Some("gpt-4.1-mini".to_string()),
                base_url: None,
                api_key: Some(key),
            }),
            storage: StorageConfig {
                sqlite_path: sqlite_path.to_string(),
            },
            event: EventConfig::default(),
        }
    }

    /// Builds a config from the deployment environment variables the
    /// platform already ships with.
    pub fn from_env() -> Result<Self> {
        let sqlite_path =
            env::var("CHATBOT_SQLITE_PATH").unwrap_or_else(|_| "concierge.db".to_string());
        let mut config = Self::convention_defaults(&sqlite_path);

        if let Ok(value) = env::var("CHATBOT_ENABLED") {
            config.chatbot.enabled = matches!(value.trim(), "1" | "true" | "yes");
        }
        if let Ok(value) = env::var("CHATBOT_HISTORY_WINDOW") {
            config.chatbot.history_window = value
                .parse()
                .map_err(|e| ConciergeError::Config(format!("CHATBOT_HISTORY_WINDOW: {e}")))?;
        }
        if let Ok(value) = env::var("CHATBOT_MAX_TOKENS") {
            config.chatbot.max_tokens = value
                .parse()
                .map_err(|e| ConciergeError::Config(format!("CHATBOT_MAX_TOKENS: {e}")))?;
        }
        if let Ok(value) = env::var("CHATBOT_TEMPERATURE") {
            config.chatbot.temperature = value
                .parse()
                .map_err(|e| ConciergeError::Config(format!("CHATBOT_TEMPERATURE: {e}")))?;
        }
        if let Ok(value) = env::var("CHATBOT_PROVIDER_TIMEOUT_SECS") {
            config.chatbot.provider_timeout_secs = value.parse().map_err(|e| {
                ConciergeError::Config(format!("CHATBOT_PROVIDER_TIMEOUT_SECS: {e}"))
            })?;
        }

        if let Ok(base_url) = env::var("OLLAMA_BASE_URL") {
            config.primary.base_url = Some(base_url);
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            config.primary.model = Some(model);
        }
        if let Some(secondary) = &mut config.secondary {
            if let Ok(model) = env::var("OPENAI_MODEL") {
                secondary.model = Some(model);
            }
            if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
                secondary.base_url = Some(base_url);
            }
        }

        // CHATBOT_LLM_PROVIDER=openai promotes the cloud provider to
        // primary; the local daemon then acts as the fallback.
        if let Ok(preferred) = env::var("CHATBOT_LLM_PROVIDER") {
            if preferred.trim().eq_ignore_ascii_case("openai") {
                if let Some(secondary) = config.secondary.take() {
                    let previous_primary = std::mem::replace(&mut config.primary, secondary);
                    config.secondary = Some(previous_primary);
                }
            }
        }

        if let Ok(name) = env::var("EVENT_NAME") {
            config.event.name = name;
        }
        if let Ok(venue) = env::var("EVENT_VENUE") {
            config.event.venue = venue;
        }
        if let Ok(start) = env::var("EVENT_START_DATE") {
            config.event.start_date = start;
        }
        if let Ok(end) = env::var("EVENT_END_DATE") {
            config.event.end_date = end;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_conventions() {
        let chatbot = ChatbotConfig::default();
        assert!(chatbot.enabled);
        assert_eq!(chatbot.history_window, 10);
        assert_eq!(chatbot.max_tokens, 500);
        assert_eq!(chatbot.provider_timeout_secs, 30);
    }

    #[test]
    fn parses_minimal_json_config() {
        let config = Config::from_json_str(
            r#"{
                "primary": {"kind": "ollama", "model": "llama2", "base_url": "http://localhost:11434", "api_key": null},
                "secondary": null,
                "storage": {"sqlite_path": ":memory:"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.primary.kind, ProviderKind::Ollama);
        assert!(config.secondary.is_none());
        assert_eq!(config.chatbot.history_window, 10);
        assert_eq!(config.event.name, "Expo");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConciergeError::Config(_)));
    }
}
