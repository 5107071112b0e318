use httpmock::prelude::*;
use portfolio_loader::core::retry::RetryPolicy;
use portfolio_loader::domain::model::{ContactMessage, ContentDomain, DataSource};
use portfolio_loader::domain::ports::ContentApi;
use portfolio_loader::{
    ApiError, ContentStore, HttpContentApi, LoadPhase, LoadSettings, MemorySessionStore,
    PortfolioApp, SiteConfig, SiteError, WelcomeState,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fast_config(server: &MockServer) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.api.base_url = server.url("/api");
    config.retry.standard = RetryPolicy::no_retry();
    config.welcome.first_visit_ms = 100;
    config.welcome.returning_ms = 50;
    for domain_ms in [
        &mut config.timeouts.home_ms,
        &mut config.timeouts.projects_ms,
        &mut config.timeouts.experiences_ms,
        &mut config.timeouts.skills_ms,
        &mut config.timeouts.stats_ms,
    ] {
        *domain_ms = 1_000;
    }
    config
}

fn api(config: &SiteConfig) -> Arc<dyn ContentApi> {
    Arc::new(HttpContentApi::from_config(config).unwrap())
}

async fn mock_all_domains(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/home");
            then.status(200)
                .json_body(json!({ "data": { "name": "Ada", "title": "Engineer" } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/projects");
            then.status(200).json_body(json!({
                "data": [
                    { "id": "p1", "title": "Engine", "featured": true },
                    { "id": "p2", "title": "Notes" }
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/experiences");
            then.status(200).json_body(json!({
                "data": [
                    { "id": "e1", "company": "Acme", "role": "Dev", "startDate": "2021-03-01" }
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/skills");
            then.status(200).json_body(json!({
                "data": { "backend": [ { "name": "Rust", "level": 90 } ] }
            }));
        })
        .await;
}

#[tokio::test]
async fn test_full_load_with_one_failing_domain_uses_fallback() {
    let server = MockServer::start_async().await;
    mock_all_domains(&server).await;
    let stats_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(500).json_body(json!({ "message": "boom" }));
        })
        .await;

    let config = fast_config(&server);
    let app = PortfolioApp::mount(api(&config), &config, Arc::new(MemorySessionStore::new()));
    assert!(app.show_welcome());

    app.start().await;
    let state = app.ready().await;

    stats_mock.assert_async().await;
    assert!(state.data_loaded);
    assert!(!state.loading);
    assert_eq!(state.home.name, "Ada");
    assert_eq!(state.projects.len(), 2);
    assert!(state.experiences[0].is_current());
    assert_eq!(state.skills.backend[0].name, "Rust");
    assert_eq!(state.source(ContentDomain::Home), DataSource::Api);
    assert_eq!(state.source(ContentDomain::Stats), DataSource::Fallback);
    assert_eq!(state.stats.projects_completed, 0);

    assert_eq!(app.store().phase(), LoadPhase::Settled);
    assert_eq!(app.gate().state(), WelcomeState::Dismissed);
    assert_eq!(app.store().featured_projects().await.len(), 1);
    app.teardown();
}

#[tokio::test]
async fn test_slow_domain_falls_back_at_its_deadline() {
    let server = MockServer::start_async().await;
    mock_all_domains(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "data": { "projectsCompleted": 12 } }));
        })
        .await;

    let mut config = fast_config(&server);
    config.timeouts.stats_ms = 200;
    let store = ContentStore::new(api(&config), LoadSettings::from_config(&config));

    let started = Instant::now();
    store.load_all().await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(2), "load took {:?}", elapsed);
    let state = store.snapshot().await;
    assert_eq!(state.source(ContentDomain::Stats), DataSource::Fallback);
    assert_eq!(state.source(ContentDomain::Projects), DataSource::Api);
}

#[tokio::test]
async fn test_refresh_failure_keeps_loaded_data() {
    let server = MockServer::start_async().await;
    mock_all_domains(&server).await;
    let mut stats_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200)
                .json_body(json!({ "data": { "projectsCompleted": 12 } }));
        })
        .await;

    let config = fast_config(&server);
    let store = ContentStore::new(api(&config), LoadSettings::from_config(&config));
    store.load_all().await;
    assert_eq!(store.stats().await.projects_completed, 12);

    stats_mock.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(502);
        })
        .await;

    assert!(!store.refresh_stats().await);
    assert_eq!(store.stats().await.projects_completed, 12);
    assert_eq!(store.phase(), LoadPhase::Settled);
    assert_eq!(
        store.snapshot().await.source(ContentDomain::Stats),
        DataSource::Api
    );
}

#[tokio::test]
async fn test_contact_rejection_is_surfaced() {
    let server = MockServer::start_async().await;
    let contact_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/contact");
            then.status(422)
                .json_body(json!({ "message": "Email domain is not accepted" }));
        })
        .await;

    let config = fast_config(&server);
    let store = ContentStore::new(api(&config), LoadSettings::from_config(&config));
    let message = ContactMessage {
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        subject: Some("Hi".to_string()),
        message: "Let's talk".to_string(),
    };

    let err = store.submit_contact(&message).await.unwrap_err();

    contact_mock.assert_hits_async(1).await;
    assert!(matches!(
        err,
        SiteError::ApiError(ApiError::Status { status: 422, .. })
    ));
    assert_eq!(err.user_friendly_message(), "Email domain is not accepted");
}

#[tokio::test]
async fn test_invalid_contact_is_not_sent() {
    let server = MockServer::start_async().await;
    let contact_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/contact");
            then.status(201).json_body(json!({ "data": { "message": "ok" } }));
        })
        .await;

    let config = fast_config(&server);
    let store = ContentStore::new(api(&config), LoadSettings::from_config(&config));
    let message = ContactMessage {
        name: "Grace".to_string(),
        email: "not-an-email".to_string(),
        subject: None,
        message: "Hello".to_string(),
    };

    let err = store.submit_contact(&message).await.unwrap_err();

    assert!(matches!(err, SiteError::ValidationError { .. }));
    contact_mock.assert_hits_async(0).await;
}
