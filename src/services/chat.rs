use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;
use crate::domains::chat::{Conversation, Feedback, FeedbackKind, MessageRole, StoredMessage};
use crate::domains::directory::UserRole;
use crate::error::{ConciergeError, Result};
use crate::gateway::{Completion, ProviderGateway};
use crate::intent::{classify, Intent};
use crate::interfaces::store::ConversationStore;
use crate::prompt;

const DISABLED_REPLY: &str = "The assistant is currently disabled. Please contact the event desk.";
const DEGRADED_REPLY: &str =
    "The assistant is temporarily unavailable. Please try again in a few minutes.";

/// What one turn produced. `provider` is "none" when every backend
/// failed and the canned degraded reply was served.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub conversation_id: i64,
    pub message_id: i64,
    pub reply: String,
    pub intent: Intent,
    pub provider: String,
    pub model: String,
}

/// The conversational front door. One `handle_message` call runs the
/// whole turn: conversation lookup, intent classification, context
/// assembly, prompt rendering, provider call, persistence of both
/// sides of the exchange.
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    assembler: ContextAssembler,
    gateway: ProviderGateway,
    enabled: bool,
    history_window: usize,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("enabled", &self.enabled)
            .field("history_window", &self.history_window)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        assembler: ContextAssembler,
        gateway: ProviderGateway,
        enabled: bool,
        history_window: usize,
    ) -> Self {
        Self {
            store,
            assembler,
            gateway,
            enabled,
            history_window,
        }
    }

    /// Runs one chat turn. Only storage failures on the conversation
    /// row or the user message abort the turn; everything downstream
    /// degrades into a reply the caller still receives.
    pub async fn handle_message(
        &self,
        user_id: &str,
        role: UserRole,
        text: &str,
    ) -> Result<ChatReply> {
        if !self.enabled {
            return Ok(ChatReply {
                conversation_id: 0,
                message_id: 0,
                reply: DISABLED_REPLY.to_string(),
                intent: Intent::Freeform,
                provider: "none".to_string(),
                model: "none".to_string(),
            });
        }

        let conversation = self.store.get_or_create(user_id, text).await?;
        let intent = classify(text, role);
        debug!(
            user_id,
            conversation_id = conversation.id,
            intent = intent.as_str(),
            "classified message"
        );

        let snapshot = self.assembler.assemble(user_id, role, intent, text).await;
        let history = self
            .store
            .recent_history(conversation.id, self.history_window)
            .await?;
        let rendered = prompt::render(&snapshot, &history, text);

        self.store
            .append_message(conversation.id, MessageRole::User, text, None)
            .await?;

        let completion = match self.gateway.generate(&rendered).await {
            Ok(completion) => completion,
            Err(ConciergeError::ProviderUnavailable(reason)) => {
                warn!(
                    user_id,
                    conversation_id = conversation.id,
                    %reason,
                    "all providers failed, serving degraded reply"
                );
                Completion {
                    text: DEGRADED_REPLY.to_string(),
                    provider: "none".to_string(),
                    model: "none".to_string(),
                    latency_ms: 0,
                }
            }
            Err(err) => return Err(err),
        };

        let metadata = json!({
            "intent": intent.as_str(),
            "provider": completion.provider,
            "model": completion.model,
            "latency_ms": completion.latency_ms,
        });
        let assistant_message = self
            .store
            .append_message(
                conversation.id,
                MessageRole::Assistant,
                &completion.text,
                Some(metadata),
            )
            .await?;

        info!(
            user_id,
            conversation_id = conversation.id,
            intent = intent.as_str(),
            provider = %completion.provider,
            latency_ms = completion.latency_ms,
            "chat turn completed"
        );

        Ok(ChatReply {
            conversation_id: conversation.id,
            message_id: assistant_message.id,
            reply: completion.text,
            intent,
            provider: completion.provider,
            model: completion.model,
        })
    }

    pub async fn get_conversation(
        &self,
        conversation_id: i64,
        user_id: &str,
    ) -> Result<Conversation> {
        self.store.get(conversation_id, user_id).await
    }

    pub async fn list_conversations(&self, user_id: &str, limit: usize) -> Result<Vec<Conversation>> {
        self.store.list(user_id, limit).await
    }

    pub async fn conversation_messages(
        &self,
        conversation_id: i64,
        user_id: &str,
    ) -> Result<Vec<StoredMessage>> {
        self.store.messages(conversation_id, user_id).await
    }

    pub async fn deactivate_conversation(
        &self,
        conversation_id: i64,
        user_id: &str,
    ) -> Result<()> {
        self.store.deactivate(conversation_id, user_id).await
    }

    /// Hard delete; the store cascades to messages and feedback.
    pub async fn delete_conversation(&self, conversation_id: i64, user_id: &str) -> Result<()> {
        self.store.delete(conversation_id, user_id).await?;
        info!(user_id, conversation_id, "conversation deleted");
        Ok(())
    }

    pub async fn submit_feedback(
        &self,
        message_id: i64,
        user_id: &str,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<Feedback> {
        self.store
            .record_feedback(message_id, user_id, kind, comment)
            .await
    }
}
