//! Aggregated content state.
//!
//! [`ContentStore`] is the only writer of [`AppState`]. Views read it through
//! [`ContentStore::snapshot`] and observe progress through
//! [`ContentStore::subscribe`].

use crate::config::site_config::SiteConfig;
use crate::core::fallback::{load_multiple, LoadConfig};
use crate::core::fallback_data::{
    fallback_experiences, fallback_for, fallback_home, fallback_projects, fallback_skills,
    fallback_stats,
};
use crate::core::retry::{retry, RetryPolicy};
use crate::domain::model::{
    ContactAck, ContactMessage, ContentDomain, ContentPayload, DataSource, Experience, Home,
    Project, Skills, Stats,
};
use crate::domain::ports::{ConfigProvider, ContentApi};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_email, validate_max_length, validate_non_empty_field, Validate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "domain", rename_all = "snake_case")]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Settled,
    Refreshing(ContentDomain),
}

impl LoadPhase {
    /// Every domain holds a final value (refreshing keeps the previous one).
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadPhase::Settled | LoadPhase::Refreshing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub home: Home,
    pub projects: Vec<Project>,
    pub experiences: Vec<Experience>,
    pub skills: Skills,
    pub stats: Stats,
    pub sources: BTreeMap<ContentDomain, DataSource>,
    pub loading: bool,
    pub data_loaded: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            home: fallback_home(),
            projects: fallback_projects(),
            experiences: fallback_experiences(),
            skills: fallback_skills(),
            stats: fallback_stats(),
            sources: ContentDomain::ALL
                .into_iter()
                .map(|domain| (domain, DataSource::Fallback))
                .collect(),
            loading: false,
            data_loaded: false,
        }
    }
}

impl AppState {
    pub fn source(&self, domain: ContentDomain) -> DataSource {
        self.sources
            .get(&domain)
            .copied()
            .unwrap_or(DataSource::Fallback)
    }

    fn apply(&mut self, payload: ContentPayload, source: DataSource) {
        self.sources.insert(payload.domain(), source);
        match payload {
            ContentPayload::Home(home) => self.home = home,
            ContentPayload::Projects(projects) => self.projects = projects,
            ContentPayload::Experiences(experiences) => self.experiences = experiences,
            ContentPayload::Skills(skills) => self.skills = skills,
            ContentPayload::Stats(stats) => self.stats = stats,
        }
    }
}

/// Per-domain deadlines plus the retry policy wrapped around each fetch.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    timeouts: BTreeMap<ContentDomain, Duration>,
    pub retry: RetryPolicy,
}

impl LoadSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            timeouts: ContentDomain::ALL
                .into_iter()
                .map(|domain| (domain, config.domain_timeout(domain)))
                .collect(),
            retry: config.standard_retry(),
        }
    }

    pub fn with_timeout(mut self, domain: ContentDomain, timeout: Duration) -> Self {
        self.timeouts.insert(domain, timeout);
        self
    }

    pub fn with_uniform_timeout(mut self, timeout: Duration) -> Self {
        for domain in ContentDomain::ALL {
            self.timeouts.insert(domain, timeout);
        }
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(&self, domain: ContentDomain) -> Duration {
        self.timeouts.get(&domain).copied().unwrap_or_default()
    }

    pub fn longest_timeout(&self) -> Duration {
        self.timeouts.values().copied().max().unwrap_or_default()
    }
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

struct Inner {
    state: AppState,
    load_started_at: Option<Instant>,
}

pub struct ContentStore {
    api: Arc<dyn ContentApi>,
    settings: LoadSettings,
    inner: RwLock<Inner>,
    phase: watch::Sender<LoadPhase>,
}

impl ContentStore {
    pub fn new(api: Arc<dyn ContentApi>, settings: LoadSettings) -> Self {
        let (phase, _) = watch::channel(LoadPhase::Uninitialized);
        Self {
            api,
            settings,
            inner: RwLock::new(Inner {
                state: AppState::default(),
                load_started_at: None,
            }),
            phase,
        }
    }

    pub fn settings(&self) -> &LoadSettings {
        &self.settings
    }

    pub fn phase(&self) -> LoadPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadPhase> {
        self.phase.subscribe()
    }

    /// Resolves once every domain has a final value.
    pub fn settled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut phase = self.phase.subscribe();
        async move {
            let _ = phase.wait_for(LoadPhase::is_settled).await;
        }
    }

    pub async fn snapshot(&self) -> AppState {
        self.inner.read().await.state.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.state.loading
    }

    pub async fn is_data_loaded(&self) -> bool {
        self.inner.read().await.state.data_loaded
    }

    pub async fn load_started_at(&self) -> Option<Instant> {
        self.inner.read().await.load_started_at
    }

    pub async fn home(&self) -> Home {
        self.inner.read().await.state.home.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.inner.read().await.state.projects.clone()
    }

    pub async fn featured_projects(&self) -> Vec<Project> {
        self.inner
            .read()
            .await
            .state
            .projects
            .iter()
            .filter(|project| project.featured)
            .cloned()
            .collect()
    }

    pub async fn experiences(&self) -> Vec<Experience> {
        self.inner.read().await.state.experiences.clone()
    }

    pub async fn skills(&self) -> Skills {
        self.inner.read().await.state.skills.clone()
    }

    pub async fn stats(&self) -> Stats {
        self.inner.read().await.state.stats.clone()
    }

    /// Loads every domain concurrently, each through retry and the fast
    /// fallback race. Always settles; failed domains keep fallback data.
    pub async fn load_all(&self) {
        let started = Instant::now();
        {
            let mut inner = self.inner.write().await;
            inner.state.loading = true;
            inner.load_started_at = Some(started);
        }
        self.phase.send_replace(LoadPhase::Loading);
        tracing::info!("📡 Loading portfolio content");

        let configs: Vec<LoadConfig<'_, ContentPayload>> = ContentDomain::ALL
            .into_iter()
            .map(|domain| {
                let api = Arc::clone(&self.api);
                let policy = self.settings.retry.clone();
                LoadConfig::new(
                    domain.key(),
                    async move { retry(&policy, || api.fetch_domain(domain)).await },
                    fallback_for(domain),
                    self.settings.timeout(domain),
                )
            })
            .collect();

        let results = load_multiple(configs).await;

        let fallbacks = {
            let mut inner = self.inner.write().await;
            let mut fallbacks = Vec::new();
            for result in results {
                if result.is_fallback() {
                    fallbacks.push(result.data.domain());
                }
                inner.state.apply(result.data, result.source);
            }
            inner.state.loading = false;
            inner.state.data_loaded = true;
            fallbacks
        };
        self.phase.send_replace(LoadPhase::Settled);

        if fallbacks.is_empty() {
            tracing::info!("✅ Content loaded from API in {:?}", started.elapsed());
        } else {
            tracing::info!(
                "✅ Content settled in {:?} (fallback for: {})",
                started.elapsed(),
                fallbacks
                    .iter()
                    .map(ContentDomain::key)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    /// Re-fetches one domain. On failure the current value is kept and
    /// `false` is returned.
    ///
    /// During the initial load the refresh waits for it to settle first, so
    /// the load's fallback results cannot overwrite the refreshed value.
    pub async fn refresh(&self, domain: ContentDomain) -> bool {
        if self.phase() == LoadPhase::Loading {
            tracing::debug!("Refresh of {} waits for the initial load", domain);
            self.settled().await;
        }

        let entered = self.phase.send_if_modified(|phase| {
            if *phase == LoadPhase::Settled {
                *phase = LoadPhase::Refreshing(domain);
                true
            } else {
                false
            }
        });

        let applied = match retry(&self.settings.retry, || self.api.fetch_domain(domain)).await {
            Ok(payload) => {
                self.inner.write().await.state.apply(payload, DataSource::Api);
                tracing::debug!("🔄 Refreshed {}", domain);
                true
            }
            Err(error) => {
                tracing::warn!("Failed to refresh {}, keeping current data: {}", domain, error);
                false
            }
        };

        if entered {
            self.phase.send_if_modified(|phase| {
                if *phase == LoadPhase::Refreshing(domain) {
                    *phase = LoadPhase::Settled;
                    true
                } else {
                    false
                }
            });
        }
        applied
    }

    pub async fn refresh_home(&self) -> bool {
        self.refresh(ContentDomain::Home).await
    }

    pub async fn refresh_projects(&self) -> bool {
        self.refresh(ContentDomain::Projects).await
    }

    pub async fn refresh_experiences(&self) -> bool {
        self.refresh(ContentDomain::Experiences).await
    }

    pub async fn refresh_skills(&self) -> bool {
        self.refresh(ContentDomain::Skills).await
    }

    pub async fn refresh_stats(&self) -> bool {
        self.refresh(ContentDomain::Stats).await
    }

    /// Best-effort single project lookup. Does not touch the aggregate state.
    pub async fn project(&self, id: &str) -> Option<Project> {
        match retry(&self.settings.retry, || self.api.fetch_project(id)).await {
            Ok(project) => Some(project),
            Err(error) if error.is_not_found() => {
                tracing::debug!("Project {} not found", id);
                None
            }
            Err(error) => {
                tracing::debug!("Failed to fetch project {}: {}", id, error);
                None
            }
        }
    }

    /// Sends a contact-form message. Not retried and never replaced by
    /// fallback data: failures go back to the caller.
    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<ContactAck> {
        message.validate()?;

        match self.api.submit_contact(message).await {
            Ok(ack) => {
                tracing::info!("📨 Contact message from {} delivered", message.email);
                Ok(ack)
            }
            Err(error) => {
                tracing::warn!("Contact submission failed: {}", error);
                Err(SiteError::from(error))
            }
        }
    }
}

impl Validate for ContactMessage {
    fn validate(&self) -> Result<()> {
        validate_non_empty_field("name", &self.name)?;
        validate_max_length("name", &self.name, 100)?;
        validate_non_empty_field("email", &self.email)?;
        validate_email("email", &self.email)?;
        if let Some(subject) = &self.subject {
            validate_max_length("subject", subject, 200)?;
        }
        validate_non_empty_field("message", &self.message)?;
        validate_max_length("message", &self.message, 5_000)?;
        Ok(())
    }
}
