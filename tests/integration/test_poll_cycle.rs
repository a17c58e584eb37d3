//! End-to-end poll cycles against fake upstreams.
//!
//! Each test drives a real `Poller` built from the HTTP clients and checks
//! which messages reached the fake chat.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{closed_addr, spawn_upstream, Upstream, CHAT_ID};
use hwbot_core::{
    Credentials, CycleOutcome, PollerError, Poller, PracticumClient, TelegramNotifier,
};
use serde_json::json;

fn credentials() -> Credentials {
    Credentials {
        practicum_token: common::PRACTICUM_TOKEN.to_string(),
        telegram_token: common::BOT_TOKEN.to_string(),
        telegram_chat_id: CHAT_ID.to_string(),
    }
}

fn poller(upstream: &Upstream) -> Poller<Credentials, PracticumClient, TelegramNotifier> {
    Poller::new(
        credentials(),
        upstream.client(),
        upstream.notifier(),
        1_700_000_000,
        Duration::ZERO,
    )
}

fn texts(upstream: &Upstream) -> Vec<String> {
    upstream.messages().into_iter().map(|m| m.text).collect()
}

/// Tests that a status is announced once and repeated payloads stay quiet.
#[tokio::test]
async fn test_reviewing_announced_once() {
    let upstream = spawn_upstream().await;
    upstream.respond_json(&json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}]}));
    let mut poller = poller(&upstream);

    let first = poller.run_cycle().await.expect("cycle");
    assert!(matches!(first, CycleOutcome::Sent(_)));

    let second = poller.run_cycle().await.expect("cycle");
    assert_eq!(second, CycleOutcome::Unchanged);

    let sent = texts(&upstream);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Работа взята на проверку ревьюером."));
    assert!(sent[0].contains("hw1"));
}

/// Tests the full lifecycle of a submission through review.
#[tokio::test]
async fn test_status_progression() {
    let upstream = spawn_upstream().await;
    let mut poller = poller(&upstream);

    poller.run_cycle().await.expect("cycle");
    for status in ["reviewing", "reviewing", "rejected", "reviewing", "approved"] {
        upstream.respond_json(&json!({"homeworks": [{"homework_name": "final", "status": status}]}));
        poller.run_cycle().await.expect("cycle");
    }

    let sent = texts(&upstream);
    assert_eq!(sent.len(), 5, "sent: {sent:?}");
    assert_eq!(sent[0], "Нет заданий для проверки.");
    assert!(sent[2].ends_with("у ревьюера есть замечания."));
    assert!(sent[4].ends_with("Ура!"));
}

/// Tests that every request uses the same fixed window.
#[tokio::test]
async fn test_window_does_not_advance() {
    let upstream = spawn_upstream().await;
    let mut poller = poller(&upstream);

    for _ in 0..3 {
        poller.run_cycle().await.expect("cycle");
    }

    let windows: Vec<_> = upstream
        .requests()
        .into_iter()
        .filter_map(|r| r.from_date)
        .collect();
    assert_eq!(windows, vec!["1700000000"; 3]);
}

/// Tests that an HTTP failure sends nothing and the loop carries on.
#[tokio::test]
async fn test_server_error_sends_nothing() {
    let upstream = spawn_upstream().await;
    upstream.respond_raw(StatusCode::INTERNAL_SERVER_ERROR, "oops");
    let mut poller = poller(&upstream);

    let outcome = poller.run_cycle().await.expect("transport errors are not fatal");
    assert_eq!(outcome, CycleOutcome::TransportFailed);
    assert!(upstream.messages().is_empty());
    assert_eq!(poller.state().last_sent(), None);
}

/// Tests that an unreachable API sends nothing.
#[tokio::test]
async fn test_unreachable_api_sends_nothing() {
    let upstream = spawn_upstream().await;
    let addr = closed_addr().await;
    let api = PracticumClient::new(
        format!("http://{addr}/api/user_api/homework_statuses/"),
        common::PRACTICUM_TOKEN,
        Duration::from_secs(2),
    )
    .expect("client");
    let mut poller = Poller::new(credentials(), api, upstream.notifier(), 0, Duration::ZERO);

    let outcome = poller.run_cycle().await.expect("transport errors are not fatal");
    assert_eq!(outcome, CycleOutcome::TransportFailed);
    assert!(upstream.messages().is_empty());
}

/// Tests that a malformed payload is reported once, not on every cycle.
#[tokio::test]
async fn test_malformed_payload_reported_once() {
    let upstream = spawn_upstream().await;
    upstream.respond_json(&json!({"homeworks": "x"}));
    let mut poller = poller(&upstream);

    for _ in 0..3 {
        poller.run_cycle().await.expect("cycle");
    }

    let sent = texts(&upstream);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("Сбой в работе программы: "));
}

/// Tests that an unknown status is reported with its value.
#[tokio::test]
async fn test_unknown_status_reported() {
    let upstream = spawn_upstream().await;
    upstream.respond_json(&json!({"homeworks": [{"homework_name": "hw1", "status": "on_hold"}]}));
    let mut poller = poller(&upstream);

    let outcome = poller.run_cycle().await.expect("cycle");
    assert!(matches!(outcome, CycleOutcome::FailureReported(_)));
    assert!(texts(&upstream)[0].contains("on_hold"));
}

/// Tests that a chat outage does not stop the cycle.
#[tokio::test]
async fn test_chat_outage_is_swallowed() {
    let upstream = spawn_upstream().await;
    upstream.fail_chat();
    upstream.respond_json(&json!({"homeworks": [{"homework_name": "hw1", "status": "approved"}]}));
    let mut poller = poller(&upstream);

    let outcome = poller.run_cycle().await.expect("notify errors are not fatal");
    assert!(matches!(outcome, CycleOutcome::Sent(_)));
    assert!(upstream.messages().is_empty());
}

/// Tests that a poller without credentials never touches the network.
#[tokio::test]
async fn test_missing_credentials_fatal_before_any_request() {
    let upstream = spawn_upstream().await;
    let missing = Credentials::from_lookup(|_| None);
    let err = missing.expect_err("no credentials");
    assert!(err.is_fatal());

    struct Gone;
    impl hwbot_core::CredentialSource for Gone {
        fn credentials(&self) -> hwbot_core::Result<Credentials> {
            Credentials::from_lookup(|_| None)
        }
    }

    let mut poller = Poller::new(
        Gone,
        upstream.client(),
        upstream.notifier(),
        0,
        Duration::ZERO,
    );
    let err = poller.run().await.expect_err("loop must stop");
    assert!(matches!(err, PollerError::MissingCredentials { ref missing } if missing.len() == 3));
    assert!(upstream.requests().is_empty());
    assert!(upstream.messages().is_empty());
}
