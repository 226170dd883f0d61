use serde_json::json;
use tempfile::tempdir;

use expo_concierge::domains::chat::{FeedbackKind, MessageRole};
use expo_concierge::error::ConciergeError;
use expo_concierge::interfaces::store::ConversationStore;
use expo_concierge::providers::sqlite::SqliteConversationStore;

async fn store_in(dir: &tempfile::TempDir) -> SqliteConversationStore {
    let db_path = dir.path().join("chat.db");
    SqliteConversationStore::new(db_path.to_str().unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn get_or_create_reuses_active_conversation_and_titles_from_seed() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;

    let seed = "a".repeat(80);
    let first = store.get_or_create("u1", &seed).await.unwrap();
    assert!(first.title.as_deref().unwrap().ends_with("..."));
    assert_eq!(first.title.as_deref().unwrap().len(), 53);

    let second = store.get_or_create("u1", "different seed").await.unwrap();
    assert_eq!(first.id, second.id);

    store.deactivate(first.id, "u1").await.unwrap();
    let third = store.get_or_create("u1", "fresh start").await.unwrap();
    assert_ne!(first.id, third.id);
    assert_eq!(third.title.as_deref(), Some("fresh start"));
}

#[tokio::test]
async fn recent_history_is_bounded_and_chronological() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;
    let conversation = store.get_or_create("u1", "hi").await.unwrap();

    for i in 0..6 {
        store
            .append_message(conversation.id, MessageRole::User, &format!("m{i}"), None)
            .await
            .unwrap();
    }

    let history = store.recent_history(conversation.id, 4).await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
}

#[tokio::test]
async fn metadata_round_trips_as_json() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;
    let conversation = store.get_or_create("u1", "hi").await.unwrap();

    let metadata = json!({"intent": "event-info", "provider": "ollama", "latency_ms": 42});
    store
        .append_message(
            conversation.id,
            MessageRole::Assistant,
            "reply",
            Some(metadata.clone()),
        )
        .await
        .unwrap();

    let messages = store.messages(conversation.id, "u1").await.unwrap();
    assert_eq!(messages[0].metadata, Some(metadata));
}

#[tokio::test]
async fn ownership_checks_reject_foreign_users() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;
    let conversation = store.get_or_create("owner", "hi").await.unwrap();

    let err = store.get(conversation.id, "intruder").await.unwrap_err();
    assert!(matches!(err, ConciergeError::NotAuthorized));

    let err = store
        .messages(conversation.id, "intruder")
        .await
        .unwrap_err();
    assert!(matches!(err, ConciergeError::NotAuthorized));

    let err = store.get(9999, "owner").await.unwrap_err();
    assert!(matches!(err, ConciergeError::NotFound(_)));
}

#[tokio::test]
async fn delete_cascades_to_messages_and_feedback() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;
    let conversation = store.get_or_create("u1", "hi").await.unwrap();
    let message = store
        .append_message(conversation.id, MessageRole::Assistant, "reply", None)
        .await
        .unwrap();
    store
        .record_feedback(message.id, "u1", FeedbackKind::Helpful, None)
        .await
        .unwrap();

    store.delete(conversation.id, "u1").await.unwrap();

    let err = store.get(conversation.id, "u1").await.unwrap_err();
    assert!(matches!(err, ConciergeError::NotFound(_)));
    let err = store
        .record_feedback(message.id, "u1", FeedbackKind::Helpful, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ConciergeError::NotFound(_)));
}

#[tokio::test]
async fn feedback_upserts_per_message_and_user() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;
    let conversation = store.get_or_create("u1", "hi").await.unwrap();
    let message = store
        .append_message(conversation.id, MessageRole::Assistant, "reply", None)
        .await
        .unwrap();

    let first = store
        .record_feedback(message.id, "u1", FeedbackKind::Helpful, None)
        .await
        .unwrap();
    let second = store
        .record_feedback(
            message.id,
            "u1",
            FeedbackKind::Inappropriate,
            Some("off topic"),
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.kind, FeedbackKind::Inappropriate);
    assert_eq!(second.comment.as_deref(), Some("off topic"));
}

#[tokio::test]
async fn list_returns_active_conversations_most_recent_first() {
    let dir = tempdir().unwrap();
    let store = store_in(&dir).await;

    let first = store.get_or_create("u1", "first").await.unwrap();
    store.deactivate(first.id, "u1").await.unwrap();
    let second = store.get_or_create("u1", "second").await.unwrap();

    let listed = store.list("u1", 10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);

    assert!(store.list("u2", 10).await.unwrap().is_empty());
}
