//! Impersonation flow tests: the identity stack across real session calls.

use desk_client::testing::MockTransport;
use desk_client::ApiClient;
use desk_session::{SessionError, SessionManager};
use desk_transport::MemoryCookies;
use serde_json::json;
use std::sync::Arc;

fn harness() -> (SessionManager, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let cookies = Arc::new(MemoryCookies::new());
    let client = Arc::new(
        ApiClient::with_transport("https://desk.example.com/api/v1", transport.clone(), cookies)
            .unwrap(),
    );
    (SessionManager::new(client), transport)
}

fn server_user(id: i64, email: &str) -> serde_json::Value {
    json!({"id": id, "email": email, "role": "agent", "is_superuser": id == 1})
}

async fn login_as_admin(session: &SessionManager, transport: &MockTransport) {
    transport.queue_json(200, json!({"user": server_user(1, "admin@example.com")}));
    session.login("admin", "hunter2", None).await.unwrap();
}

#[tokio::test]
async fn impersonate_swaps_profile_and_stashes_original() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    transport.queue_json(200, json!({"user": server_user(9, "agent@example.com")}));
    let user = session.impersonate(9).await.unwrap();

    assert_eq!(user.id, 9);
    assert!(session.is_impersonating());
    assert_eq!(session.current_user().unwrap().email, "agent@example.com");

    let request = transport.last_request().unwrap();
    assert!(request.url.as_str().ends_with("/users/9/impersonate/"));
}

#[tokio::test]
async fn stop_impersonating_restores_the_original_identity() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    transport.queue_json(200, json!({"user": server_user(9, "agent@example.com")}));
    session.impersonate(9).await.unwrap();

    transport.queue_json(200, json!({"ok": true}));
    let restored = session.stop_impersonating().await.unwrap();

    assert_eq!(restored.id, 1);
    assert!(!session.is_impersonating());
    assert_eq!(session.current_user().unwrap().email, "admin@example.com");
}

#[tokio::test]
async fn chained_impersonation_keeps_the_real_identity_saved() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    transport.queue_json(200, json!({"user": server_user(9, "agent@example.com")}));
    session.impersonate(9).await.unwrap();

    transport.queue_json(200, json!({"user": server_user(12, "viewer@example.com")}));
    session.impersonate(12).await.unwrap();

    assert_eq!(session.current_user().unwrap().id, 12);

    transport.queue_json(200, json!({"ok": true}));
    let restored = session.stop_impersonating().await.unwrap();
    // One pop restores the admin, not the intermediate agent.
    assert_eq!(restored.id, 1);
    assert!(!session.is_impersonating());
}

#[tokio::test]
async fn impersonate_requires_a_session() {
    let (session, _transport) = harness();

    let error = session.impersonate(9).await.unwrap_err();
    assert!(matches!(error, SessionError::NotAuthenticated));
}

#[tokio::test]
async fn stop_without_active_impersonation_is_an_error() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    let error = session.stop_impersonating().await.unwrap_err();
    assert!(matches!(error, SessionError::NotImpersonating));
}

#[tokio::test]
async fn failed_stop_call_leaves_impersonation_intact() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    transport.queue_json(200, json!({"user": server_user(9, "agent@example.com")}));
    session.impersonate(9).await.unwrap();

    transport.queue_json(403, json!({"detail": "Forbidden"}));
    let result = session.stop_impersonating().await;

    assert!(result.is_err());
    assert!(session.is_impersonating());
    assert_eq!(session.current_user().unwrap().id, 9);
}

#[tokio::test]
async fn logout_discards_the_saved_identity() {
    let (session, transport) = harness();
    login_as_admin(&session, &transport).await;

    transport.queue_json(200, json!({"user": server_user(9, "agent@example.com")}));
    session.impersonate(9).await.unwrap();

    transport.queue_json(200, json!({}));
    session.logout().await;

    assert!(!session.is_impersonating());
    assert!(session.current_user().is_none());
}
