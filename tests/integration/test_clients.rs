//! Integration tests for the HTTP clients against fake upstreams.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{closed_addr, spawn_upstream, BOT_TOKEN, CHAT_ID};
use hwbot_core::{HomeworkApi, Notifier, PollerError, PracticumClient, TelegramNotifier};
use serde_json::json;

// ============================================================================
// Homework API client
// ============================================================================

/// Tests that the client authorizes with OAuth and passes the window.
#[tokio::test]
async fn test_fetch_sends_token_and_from_date() {
    let upstream = spawn_upstream().await;
    let body = json!({"homeworks": [{"homework_name": "hw1", "status": "approved"}]});
    upstream.respond_json(&body);

    let value = upstream.client().fetch(1_700_000_000).await.expect("fetch");
    assert_eq!(value, body);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("OAuth practicum-token")
    );
    assert_eq!(requests[0].from_date.as_deref(), Some("1700000000"));
}

/// Tests that any status other than 200 is a transport error.
#[tokio::test]
async fn test_fetch_non_ok_status_is_transport_error() {
    let upstream = spawn_upstream().await;
    upstream.respond_raw(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance");

    let err = upstream.client().fetch(0).await.expect_err("should fail");
    assert!(err.is_transport(), "got: {err:?}");
    assert!(matches!(err, PollerError::UnexpectedStatus { status: 503, .. }));
}

/// Tests that a 2xx other than 200 is still rejected.
#[tokio::test]
async fn test_fetch_no_content_is_rejected() {
    let upstream = spawn_upstream().await;
    upstream.respond_raw(StatusCode::NO_CONTENT, "");

    let err = upstream.client().fetch(0).await.expect_err("should fail");
    assert!(matches!(err, PollerError::UnexpectedStatus { status: 204, .. }));
}

/// Tests that an unparseable body is a transport error.
#[tokio::test]
async fn test_fetch_invalid_json_is_transport_error() {
    let upstream = spawn_upstream().await;
    upstream.respond_raw(StatusCode::OK, "<html>not json</html>");

    let err = upstream.client().fetch(0).await.expect_err("should fail");
    assert!(matches!(err, PollerError::Transport(_)), "got: {err:?}");
}

/// Tests that a refused connection is a transport error.
#[tokio::test]
async fn test_fetch_connection_refused_is_transport_error() {
    let addr = closed_addr().await;
    let client = PracticumClient::new(
        format!("http://{addr}/api/user_api/homework_statuses/"),
        "token",
        Duration::from_secs(2),
    )
    .expect("client");

    let err = client.fetch(0).await.expect_err("should fail");
    assert!(err.is_transport());
    assert!(!err.is_fatal());
}

// ============================================================================
// Telegram notifier
// ============================================================================

/// Tests that the notifier posts the text to the configured chat.
#[tokio::test]
async fn test_send_posts_chat_id_and_text() {
    let upstream = spawn_upstream().await;

    upstream
        .notifier()
        .send("Нет заданий для проверки.")
        .await
        .expect("send");

    let messages = upstream.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].bot, format!("bot{BOT_TOKEN}"));
    assert_eq!(messages[0].chat_id, CHAT_ID);
    assert_eq!(messages[0].text, "Нет заданий для проверки.");
}

/// Tests that a rejection by the chat API surfaces as a notify error.
#[tokio::test]
async fn test_send_rejected_is_notify_error() {
    let upstream = spawn_upstream().await;
    upstream.fail_chat();

    let err = upstream.notifier().send("hello").await.expect_err("should fail");
    assert!(
        matches!(&err, PollerError::Notify { message } if message.contains("chat not found")),
        "got: {err:?}"
    );
}

/// Tests that an unreachable chat API surfaces as a notify error.
#[tokio::test]
async fn test_send_unreachable_is_notify_error() {
    let addr = closed_addr().await;
    let notifier = TelegramNotifier::new(
        &format!("http://{addr}"),
        "secret-token",
        CHAT_ID,
        Duration::from_secs(2),
    )
    .expect("notifier");

    let err = notifier.send("hello").await.expect_err("should fail");
    assert!(matches!(err, PollerError::Notify { .. }));
    assert!(!err.to_string().contains("secret-token"));
}
