use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a persisted chat message. Closed set, mirrored by a CHECK
/// constraint in the sqlite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            "system" => Some(MessageRole::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Helpful,
    NotHelpful,
    Inappropriate,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Helpful => "helpful",
            FeedbackKind::NotHelpful => "not_helpful",
            FeedbackKind::Inappropriate => "inappropriate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "helpful" => Some(FeedbackKind::Helpful),
            "not_helpful" => Some(FeedbackKind::NotHelpful),
            "inappropriate" => Some(FeedbackKind::Inappropriate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One persisted message. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<Value>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub message_id: i64,
    pub user_id: String,
    pub kind: FeedbackKind,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Conversation titles are seeded from the first user message.
pub fn title_from_message(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > 50 {
        let cut: String = trimmed.chars().take(50).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}
