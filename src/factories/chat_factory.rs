use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{Config, ProviderConfig, ProviderKind};
use crate::context::ContextAssembler;
use crate::error::{ConciergeError, Result};
use crate::gateway::ProviderGateway;
use crate::interfaces::directory::DirectorySource;
use crate::interfaces::providers::LlmProvider;
use crate::providers::ollama::OllamaProvider;
use crate::providers::openai::OpenAiProvider;
use crate::providers::sqlite::SqliteConversationStore;
use crate::services::chat::ChatService;

fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.kind {
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::new(
            config.base_url.clone(),
            config.model.clone(),
        ))),
        ProviderKind::Openai => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| {
                    ConciergeError::Config("openai provider requires an api key".to_string())
                })?;
            Ok(Arc::new(OpenAiProvider::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
            )))
        }
    }
}

/// Wires config into a ready chat service: provider chain, gateway,
/// sqlite store (migrations included), context assembler.
pub async fn create_chat_service(
    config: &Config,
    directory: Arc<dyn DirectorySource>,
) -> Result<ChatService> {
    let mut providers = vec![build_provider(&config.primary)?];
    if let Some(secondary) = &config.secondary {
        providers.push(build_provider(secondary)?);
    }

    let gateway = ProviderGateway::new(
        providers,
        Duration::from_secs(config.chatbot.provider_timeout_secs),
        config.chatbot.max_tokens,
        config.chatbot.temperature,
    )?;
    info!(
        fallback = gateway.has_fallback(),
        enabled = config.chatbot.enabled,
        "provider gateway ready"
    );

    let store = Arc::new(SqliteConversationStore::new(&config.storage.sqlite_path).await?);
    let assembler = ContextAssembler::new(directory, config.chatbot.seller_search_limit);

    Ok(ChatService::new(
        store,
        assembler,
        gateway,
        config.chatbot.enabled,
        config.chatbot.history_window,
    ))
}
