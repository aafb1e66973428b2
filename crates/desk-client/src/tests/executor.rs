//! Retry policy and response classification through the full executor loop.

use super::harness;
use crate::{ApiError, Payload, RequestOptions, RetryPolicy};
use serde_json::json;
use std::time::{Duration, Instant};

#[tokio::test]
async fn server_error_retries_then_surfaces_last_failure() {
    let (client, transport, _) = harness();
    transport.queue_json(503, json!({"detail": "unavailable"}));
    transport.queue_json(503, json!({"detail": "still unavailable"}));

    let error = client
        .execute("/incidents/incidents/", RequestOptions::get())
        .await
        .unwrap_err();

    // Default policy: 1 extra attempt, 2 total.
    assert_eq!(transport.request_count(), 2);
    match error {
        ApiError::Status { status, payload } => {
            assert_eq!(status, 503);
            assert_eq!(payload.str_field("detail"), Some("still unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn network_error_retries_then_surfaces() {
    let (client, transport, _) = harness();
    transport.queue_network_error("connection refused");
    transport.queue_network_error("connection refused");

    let error = client
        .execute("/incidents/incidents/", RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(transport.request_count(), 2);
    assert!(matches!(error, ApiError::Network(_)));
}

#[tokio::test]
async fn client_error_makes_exactly_one_attempt() {
    let (client, transport, _) = harness();
    transport.queue_json(404, json!({"detail": "Not found."}));

    let error = client
        .execute("/incidents/incidents/999/", RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(error.status(), Some(404));
}

#[tokio::test]
async fn transient_failure_then_success_recovers() {
    let (client, transport, _) = harness();
    transport.queue_network_error("reset by peer");
    transport.queue_json(200, json!({"results": [], "count": 0}));

    let payload = client
        .execute("/problems/problems/", RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
    assert_eq!(payload.as_json().unwrap()["count"], json!(0));
}

#[tokio::test]
async fn retries_option_overrides_policy_default() {
    let (client, transport, _) = harness();
    for _ in 0..4 {
        transport.queue_network_error("refused");
    }

    let result = client
        .execute(
            "/changes/changes/",
            RequestOptions::get().with_retries(3),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 4);
}

#[tokio::test]
async fn zero_retries_fails_fast() {
    let (client, transport, _) = harness();
    transport.queue_network_error("refused");

    let client = client.with_retry_policy(RetryPolicy::none());
    let result = client.execute("/assets/assets/", RequestOptions::get()).await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn retry_waits_the_fixed_backoff() {
    let (client, transport, _) = harness();
    transport.queue_json(500, json!({}));
    transport.queue_json(200, json!({}));

    let started = Instant::now();
    client
        .execute("/cmdb/config-items/", RequestOptions::get())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn idempotent_only_policy_does_not_retry_a_post() {
    let (client, transport, _) = harness();
    transport.queue_json(502, json!({}));

    let client = client.with_retry_policy(RetryPolicy::idempotent_only());
    let error = client
        .execute(
            "/incidents/incidents/",
            RequestOptions::post(json!({"title": "X"})),
        )
        .await
        .unwrap_err();

    assert_eq!(transport.request_count(), 1);
    assert_eq!(error.status(), Some(502));
}

#[tokio::test]
async fn successful_create_resolves_without_retry() {
    let (client, transport, _) = harness();
    transport.queue_json(201, json!({"id": 42, "ticket_number": "INC-0042"}));

    let payload = client
        .execute(
            "/incidents/incidents/",
            RequestOptions::post(json!({
                "title": "X",
                "description": "Y",
                "category": "Network",
            })),
        )
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 1);
    let body = payload.as_json().unwrap();
    assert_eq!(body["id"], json!(42));
    assert_eq!(body["ticket_number"], json!("INC-0042"));
}

#[tokio::test]
async fn decode_failure_is_an_error_not_a_panic() {
    let (client, transport, _) = harness();
    transport.queue(crate::testing::MockOutcome::text(
        200,
        Some("application/json"),
        "{broken",
    ));

    let error = client
        .execute("/knowledge/articles/", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Decode(_)));
    // Decode failures are terminal, not retried.
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn non_json_success_returns_text_payload() {
    let (client, transport, _) = harness();
    transport.queue(crate::testing::MockOutcome::text(
        200,
        Some("text/csv"),
        "id,title\n1,Printer down\n",
    ));

    let payload = client
        .execute("/sla/reports/export/", RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(
        payload,
        Payload::Text("id,title\n1,Printer down\n".to_string())
    );
}
