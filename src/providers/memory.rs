use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domains::chat::{
    title_from_message, Conversation, Feedback, FeedbackKind, MessageRole, StoredMessage,
};
use crate::error::{ConciergeError, Result};
use crate::interfaces::store::ConversationStore;

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Default)]
struct State {
    conversations: Vec<Conversation>,
    messages: Vec<StoredMessage>,
    feedback: Vec<Feedback>,
    next_conversation_id: i64,
    next_message_id: i64,
    next_feedback_id: i64,
}

/// In-process store with the same contract as the sqlite one. Used by
/// the test suite and by embedded deployments that do not need
/// durability.
#[derive(Default)]
pub struct InMemoryConversationStore {
    state: Mutex<State>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn owned_conversation(&self, conversation_id: i64, user_id: &str) -> Result<&Conversation> {
        let conversation = self
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| ConciergeError::NotFound(format!("conversation {conversation_id}")))?;
        if conversation.user_id != user_id {
            return Err(ConciergeError::NotAuthorized);
        }
        Ok(conversation)
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(&self, user_id: &str, title_seed: &str) -> Result<Conversation> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .max_by_key(|c| (c.updated_at, c.id))
        {
            return Ok(existing.clone());
        }

        let now = now_ts();
        state.next_conversation_id += 1;
        let conversation = Conversation {
            id: state.next_conversation_id,
            user_id: user_id.to_string(),
            title: Some(title_from_message(title_seed)),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, conversation_id: i64, user_id: &str) -> Result<Conversation> {
        let state = self.state.lock().await;
        state
            .owned_conversation(conversation_id, user_id)
            .map(Clone::clone)
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Conversation>> {
        let state = self.state.lock().await;
        let mut owned: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .cloned()
            .collect();
        owned.sort_by_key(|c| std::cmp::Reverse((c.updated_at, c.id)));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        metadata: Option<Value>,
    ) -> Result<StoredMessage> {
        let mut state = self.state.lock().await;
        let now = now_ts();

        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| ConciergeError::NotFound(format!("conversation {conversation_id}")))?;
        conversation.updated_at = now;

        state.next_message_id += 1;
        let message = StoredMessage {
            id: state.next_message_id,
            conversation_id,
            role,
            content: content.to_string(),
            metadata,
            created_at: now,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_history(
        &self,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let state = self.state.lock().await;
        let mut history: Vec<StoredMessage> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        history.sort_by_key(|m| (m.created_at, m.id));
        if history.len() > limit {
            history.drain(..history.len() - limit);
        }
        Ok(history)
    }

    async fn messages(&self, conversation_id: i64, user_id: &str) -> Result<Vec<StoredMessage>> {
        let state = self.state.lock().await;
        state.owned_conversation(conversation_id, user_id)?;
        let mut all: Vec<StoredMessage> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        all.sort_by_key(|m| (m.created_at, m.id));
        Ok(all)
    }

    async fn deactivate(&self, conversation_id: i64, user_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.owned_conversation(conversation_id, user_id)?;
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| ConciergeError::NotFound(format!("conversation {conversation_id}")))?;
        conversation.is_active = false;
        Ok(())
    }

    async fn delete(&self, conversation_id: i64, user_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.owned_conversation(conversation_id, user_id)?;

        let dropped_messages: Vec<i64> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| m.id)
            .collect();
        state
            .feedback
            .retain(|f| !dropped_messages.contains(&f.message_id));
        state.messages.retain(|m| m.conversation_id != conversation_id);
        state.conversations.retain(|c| c.id != conversation_id);
        Ok(())
    }

    async fn record_feedback(
        &self,
        message_id: i64,
        user_id: &str,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<Feedback> {
        let mut state = self.state.lock().await;
        let conversation_id = state
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .map(|m| m.conversation_id)
            .ok_or_else(|| ConciergeError::NotFound(format!("message {message_id}")))?;
        state.owned_conversation(conversation_id, user_id)?;

        if let Some(existing) = state
            .feedback
            .iter_mut()
            .find(|f| f.message_id == message_id && f.user_id == user_id)
        {
            existing.kind = kind;
            existing.comment = comment.map(str::to_string);
            return Ok(existing.clone());
        }

        state.next_feedback_id += 1;
        let feedback = Feedback {
            id: state.next_feedback_id,
            message_id,
            user_id: user_id.to_string(),
            kind,
            comment: comment.map(str::to_string),
            created_at: now_ts(),
        };
        state.feedback.push(feedback.clone());
        Ok(feedback)
    }
}
