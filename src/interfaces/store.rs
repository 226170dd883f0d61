use async_trait::async_trait;
use serde_json::Value;

use crate::domains::chat::{Conversation, Feedback, FeedbackKind, MessageRole, StoredMessage};
use crate::error::Result;

/// Conversation persistence. Every call is one transaction; ownership
/// checks happen here, at the query boundary, never in the LLM layer.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Returns the caller's active conversation, creating one titled
    /// from `title_seed` if none exists.
    async fn get_or_create(&self, user_id: &str, title_seed: &str) -> Result<Conversation>;

    /// Fetches one conversation with an ownership check.
    /// `NotFound` for missing ids, `NotAuthorized` for foreign ones.
    async fn get(&self, conversation_id: i64, user_id: &str) -> Result<Conversation>;

    /// Active conversations for a user, most recently updated first.
    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Conversation>>;

    /// Appends one immutable message and bumps the conversation's
    /// `updated_at` atomically.
    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        metadata: Option<Value>,
    ) -> Result<StoredMessage>;

    /// The most recent `limit` messages, returned oldest-first.
    async fn recent_history(&self, conversation_id: i64, limit: usize)
        -> Result<Vec<StoredMessage>>;

    /// All messages of a conversation, oldest-first, ownership-checked.
    async fn messages(&self, conversation_id: i64, user_id: &str) -> Result<Vec<StoredMessage>>;

    /// Soft-retires a conversation (`is_active = false`).
    async fn deactivate(&self, conversation_id: i64, user_id: &str) -> Result<()>;

    /// Hard delete; cascades to messages and their feedback.
    async fn delete(&self, conversation_id: i64, user_id: &str) -> Result<()>;

    /// Records feedback on a message the caller can see. A repeat
    /// submission by the same user replaces kind and comment.
    async fn record_feedback(
        &self,
        message_id: i64,
        user_id: &str,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<Feedback>;
}
