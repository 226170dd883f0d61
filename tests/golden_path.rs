mod common;

use std::sync::Arc;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;
use tempfile::tempdir;

use expo_concierge::config::Config;
use expo_concierge::domains::directory::UserRole;
use expo_concierge::error::ConciergeError;
use expo_concierge::factories::chat_factory::create_chat_service;
use expo_concierge::intent::Intent;

use common::StubDirectory;

fn config_json(server: &MockServer, db_path: &str) -> String {
    json!({
        "primary": {
            "kind": "ollama",
            "model": "llama2",
            "base_url": server.base_url(),
            "api_key": null
        },
        "secondary": null,
        "storage": {"sqlite_path": db_path}
    })
    .to_string()
}

#[tokio::test]
async fn config_to_reply_golden_path() {
    expo_concierge::logging::init_tracing("golden-path");
    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200).json_body(json!({
                "model": "llama2",
                "response": "You have one meeting with Fresh Farms on 2026-01-11 at 10:00.",
                "done": true
            }));
        })
        .await;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("concierge.db");
    let config = Config::from_json_str(&config_json(&server, db_path.to_str().unwrap())).unwrap();

    let directory = StubDirectory::with_event().with_meeting("buyer-1", "Fresh Farms");
    let service = create_chat_service(&config, Arc::new(directory))
        .await
        .unwrap();

    let reply = service
        .handle_message("buyer-1", UserRole::Buyer, "what meetings do I have?")
        .await
        .unwrap();

    assert_eq!(reply.intent, Intent::MeetingsBuyer);
    assert_eq!(reply.provider, "ollama");
    assert!(reply.reply.contains("Fresh Farms"));
    generate.assert_calls(1);

    // The turn is durable: both messages landed in sqlite.
    let messages = service
        .conversation_messages(reply.conversation_id, "buyer-1")
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "what meetings do I have?");
    assert!(messages[1].content.contains("Fresh Farms"));
}

#[tokio::test]
async fn factory_rejects_openai_without_api_key() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("concierge.db");
    let config = Config::from_json_str(
        &json!({
            "primary": {
                "kind": "openai",
                "model": "gpt-4.1-mini",
                "base_url": null,
                "api_key": null
            },
            "secondary": null,
            "storage": {"sqlite_path": db_path.to_str().unwrap()}
        })
        .to_string(),
    )
    .unwrap();

    let err = create_chat_service(&config, Arc::new(StubDirectory::with_event()))
        .await
        .unwrap_err();
    assert!(matches!(err, ConciergeError::Config(_)));
}
