use crate::domain::model::{
    AdminIdentity, ContactAck, ContactMessage, Experience, Home, Project, Skills, Stats,
};
use crate::domain::ports::{ConfigProvider, ContentApi};
use crate::utils::error::{ApiError, ApiResult, Result, SiteError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Every successful API response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`ContentApi`] over the portfolio REST API.
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: Client,
    base_url: Url,
}

impl HttpContentApi {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SiteError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SiteError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SiteError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_data<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.send(self.client.get(self.endpoint(segments))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        tracing::debug!("{} -> {}", response.url(), response.status());
        let response = Self::check_status(response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();

        Err(ApiError::status(status.as_u16(), message))
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn fetch_home(&self) -> ApiResult<Home> {
        self.get_data(&["home"]).await
    }

    async fn fetch_projects(&self) -> ApiResult<Vec<Project>> {
        self.get_data(&["projects"]).await
    }

    async fn fetch_project(&self, id: &str) -> ApiResult<Project> {
        self.get_data(&["projects", id]).await
    }

    async fn fetch_experiences(&self) -> ApiResult<Vec<Experience>> {
        self.get_data(&["experiences"]).await
    }

    async fn fetch_skills(&self) -> ApiResult<Skills> {
        self.get_data(&["skills"]).await
    }

    async fn fetch_stats(&self) -> ApiResult<Stats> {
        self.get_data(&["stats"]).await
    }

    async fn submit_contact(&self, message: &ContactMessage) -> ApiResult<ContactAck> {
        let request = self.client.post(self.endpoint(&["contact"])).json(message);
        self.send(request).await
    }

    async fn verify_token(&self, token: &str) -> ApiResult<AdminIdentity> {
        let request = self
            .client
            .get(self.endpoint(&["auth", "verify"]))
            .bearer_auth(token);
        self.send(request).await
    }
}
