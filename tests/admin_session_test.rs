use httpmock::prelude::*;
use portfolio_loader::core::auth::{AdminSession, ADMIN_TOKEN_KEY};
use portfolio_loader::core::preferences::{Theme, ThemePreference};
use portfolio_loader::core::retry::RetryPolicy;
use portfolio_loader::domain::ports::{ContentApi, DurableStore};
use portfolio_loader::{ApiError, FileDurableStore, HttpContentApi, SiteError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn quick_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        silent: true,
    }
}

fn session_for(
    server: &MockServer,
    dir: &TempDir,
    max_retries: u32,
) -> (AdminSession<FileDurableStore>, Arc<FileDurableStore>) {
    let api: Arc<dyn ContentApi> =
        Arc::new(HttpContentApi::new(&server.url("/api"), Duration::from_secs(5)).unwrap());
    let store = Arc::new(FileDurableStore::new(dir.path()));
    let session = AdminSession::new(api, Arc::clone(&store)).with_policy(quick_policy(max_retries));
    (session, store)
}

#[tokio::test]
async fn test_signed_out_session_does_not_call_api() {
    let server = MockServer::start_async().await;
    let verify_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/verify");
            then.status(200).json_body(json!({ "data": { "username": "admin" } }));
        })
        .await;
    let dir = TempDir::new().unwrap();
    let (session, _) = session_for(&server, &dir, 0);

    assert!(session.verify().await.unwrap().is_none());
    verify_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_valid_token_survives_restart() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/auth/verify")
                .header("authorization", "Bearer good-token");
            then.status(200).json_body(json!({
                "data": { "username": "admin", "expiresAt": "2999-01-01T00:00:00Z" }
            }));
        })
        .await;
    let dir = TempDir::new().unwrap();

    {
        let (session, _) = session_for(&server, &dir, 0);
        session.sign_in("  good-token\n").unwrap();
    }

    let (session, _) = session_for(&server, &dir, 0);
    let identity = session.verify().await.unwrap().unwrap();
    assert_eq!(identity.username, "admin");
    assert_eq!(session.token().unwrap().as_deref(), Some("good-token"));
}

#[tokio::test]
async fn test_rejected_token_is_cleared() {
    let server = MockServer::start_async().await;
    let verify_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/verify");
            then.status(401).json_body(json!({ "message": "Invalid token" }));
        })
        .await;
    let dir = TempDir::new().unwrap();
    let (session, store) = session_for(&server, &dir, 3);
    session.sign_in("stale").unwrap();

    assert!(session.verify().await.unwrap().is_none());

    verify_mock.assert_hits_async(1).await;
    assert!(store.get(ADMIN_TOKEN_KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_expired_identity_is_signed_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/verify");
            then.status(200).json_body(json!({
                "data": { "username": "admin", "expiresAt": "2000-01-01T00:00:00Z" }
            }));
        })
        .await;
    let dir = TempDir::new().unwrap();
    let (session, _) = session_for(&server, &dir, 0);
    session.sign_in("old").unwrap();

    assert!(session.verify().await.unwrap().is_none());
    assert!(session.token().unwrap().is_none());
}

#[tokio::test]
async fn test_server_errors_are_retried_then_returned_without_signing_out() {
    let server = MockServer::start_async().await;
    let verify_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/verify");
            then.status(503).json_body(json!({ "message": "maintenance" }));
        })
        .await;
    let dir = TempDir::new().unwrap();
    let (session, _) = session_for(&server, &dir, 2);
    session.sign_in("token").unwrap();

    let err = session.verify().await.unwrap_err();

    verify_mock.assert_hits_async(3).await;
    assert!(matches!(
        err,
        SiteError::ApiError(ApiError::Status { status: 503, .. })
    ));
    assert_eq!(session.token().unwrap().as_deref(), Some("token"));
}

#[tokio::test]
async fn test_theme_and_token_share_one_store_file() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();
    let (session, store) = session_for(&server, &dir, 0);

    let theme = ThemePreference::new(Arc::clone(&store));
    assert_eq!(theme.toggle().unwrap(), Theme::Light);
    session.sign_in("token").unwrap();
    session.sign_out().unwrap();

    let reopened = ThemePreference::new(Arc::new(FileDurableStore::new(dir.path())));
    assert_eq!(reopened.load().unwrap(), Theme::Light);
    assert!(store.file_path().exists());
}
