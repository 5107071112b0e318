use crate::domain::model::{
    AdminIdentity, ContactAck, ContactMessage, ContentDomain, ContentPayload, Experience, Home,
    Project, Skills, Stats,
};
use crate::core::retry::RetryPolicy;
use crate::utils::error::{ApiResult, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Remote source of portfolio content.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn fetch_home(&self) -> ApiResult<Home>;
    async fn fetch_projects(&self) -> ApiResult<Vec<Project>>;
    async fn fetch_project(&self, id: &str) -> ApiResult<Project>;
    async fn fetch_experiences(&self) -> ApiResult<Vec<Experience>>;
    async fn fetch_skills(&self) -> ApiResult<Skills>;
    async fn fetch_stats(&self) -> ApiResult<Stats>;
    async fn submit_contact(&self, message: &ContactMessage) -> ApiResult<ContactAck>;
    async fn verify_token(&self, token: &str) -> ApiResult<AdminIdentity>;

    async fn fetch_domain(&self, domain: ContentDomain) -> ApiResult<ContentPayload> {
        match domain {
            ContentDomain::Home => self.fetch_home().await.map(ContentPayload::Home),
            ContentDomain::Projects => self.fetch_projects().await.map(ContentPayload::Projects),
            ContentDomain::Experiences => self
                .fetch_experiences()
                .await
                .map(ContentPayload::Experiences),
            ContentDomain::Skills => self.fetch_skills().await.map(ContentPayload::Skills),
            ContentDomain::Stats => self.fetch_stats().await.map(ContentPayload::Stats),
        }
    }
}

/// Key/value storage whose contents end with the browsing session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Key/value storage that outlives the session (preferences, admin token).
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn domain_timeout(&self, domain: ContentDomain) -> Duration;
    fn welcome_first_visit(&self) -> Duration;
    fn welcome_returning(&self) -> Duration;
    fn standard_retry(&self) -> RetryPolicy;
    fn critical_retry(&self) -> RetryPolicy;
}
