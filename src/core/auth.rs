use crate::core::retry::{retry, RetryPolicy};
use crate::domain::model::AdminIdentity;
use crate::domain::ports::{ContentApi, DurableStore};
use crate::utils::error::Result;
use std::sync::Arc;

pub const ADMIN_TOKEN_KEY: &str = "portfolio.admin_token";

/// Admin console session backed by a token in durable storage.
///
/// Verification uses the critical retry profile: a flaky backend must not
/// silently log the admin out.
pub struct AdminSession<D: DurableStore> {
    api: Arc<dyn ContentApi>,
    store: Arc<D>,
    policy: RetryPolicy,
}

impl<D: DurableStore> AdminSession<D> {
    pub fn new(api: Arc<dyn ContentApi>, store: Arc<D>) -> Self {
        Self {
            api,
            store,
            policy: RetryPolicy::critical(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sign_in(&self, token: &str) -> Result<()> {
        self.store.set(ADMIN_TOKEN_KEY, token.trim())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.remove(ADMIN_TOKEN_KEY)
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(ADMIN_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// `Ok(None)` when signed out or the token was rejected (the stored token
    /// is then cleared). Other failures are returned once retries run out.
    pub async fn verify(&self) -> Result<Option<AdminIdentity>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };

        match retry(&self.policy, || self.api.verify_token(&token)).await {
            Ok(identity) if identity.is_expired(chrono::Utc::now()) => {
                tracing::info!("Admin session for {} expired", identity.username);
                self.sign_out()?;
                Ok(None)
            }
            Ok(identity) => Ok(Some(identity)),
            Err(error) if error.is_unauthorized() => {
                tracing::info!("Admin token rejected, signing out");
                self.sign_out()?;
                Ok(None)
            }
            Err(error) => {
                tracing::warn!("Admin session check failed: {}", error);
                Err(error.into())
            }
        }
    }
}
