//! Exponential-backoff retry for network calls.

use crate::utils::error::{ApiError, SiteError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Maximum jitter added on top of the computed backoff, as a fraction of it.
pub const JITTER_RATIO: f64 = 0.1;

/// Errors that can tell whether trying again might help.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ApiError {
    fn is_retryable(&self) -> bool {
        ApiError::is_retryable(self)
    }
}

impl Retryable for SiteError {
    fn is_retryable(&self) -> bool {
        match self {
            SiteError::ApiError(api) => api.is_retryable(),
            _ => false,
        }
    }
}

/// Missing fields deserialize from [`RetryPolicy::standard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "millis")]
    pub base_delay: Duration,
    #[serde(with = "millis")]
    pub max_delay: Duration,
    /// Log attempt failures at debug level instead of warn.
    #[serde(default = "default_silent")]
    pub silent: bool,
}

fn default_silent() -> bool {
    true
}

impl RetryPolicy {
    /// Best-effort content fetches; the fallback loader absorbs whatever is left.
    pub fn standard() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2_000),
            silent: true,
        }
    }

    /// Calls that must not degrade quietly, such as the admin session check.
    pub fn critical() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(5_000),
            silent: true,
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::standard()
        }
    }

    /// Backoff before retrying after failed attempt `attempt` (0-based), without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let backoff = self.backoff(attempt);
        let ratio = rand::thread_rng().gen_range(0.0..=JITTER_RATIO);
        backoff + backoff.mul_f64(ratio)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ephemeral record of a failed attempt, used for logging only.
#[derive(Debug)]
pub struct RetryAttempt<'a, E> {
    pub attempt: u32,
    pub delay: Duration,
    pub error: &'a E,
}

impl<E: Display> RetryAttempt<'_, E> {
    fn log(&self, policy: &RetryPolicy) {
        log_attempt(
            policy,
            format_args!(
                "Attempt {} failed ({}), retrying in {:?}",
                self.attempt + 1,
                self.error,
                self.delay
            ),
        );
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_retries` retries are used up.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    retry_if(policy, operation, |err: &E| err.is_retryable()).await
}

/// Like [`retry`], with the caller deciding which errors are worth retrying.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!("Operation succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(error) => {
                if !is_retryable(&error) {
                    tracing::debug!("Non-retryable error, giving up: {}", error);
                    return Err(error);
                }
                if attempt >= policy.max_retries {
                    log_attempt(
                        policy,
                        format_args!(
                            "Giving up after {} attempts: {}",
                            attempt + 1,
                            error
                        ),
                    );
                    return Err(error);
                }

                let failed = RetryAttempt {
                    attempt,
                    delay: policy.delay_with_jitter(attempt),
                    error: &error,
                };
                failed.log(policy);
                tokio::time::sleep(failed.delay).await;
                attempt += 1;
            }
        }
    }
}

fn log_attempt(policy: &RetryPolicy, message: std::fmt::Arguments<'_>) {
    if policy.silent {
        tracing::debug!("{}", message);
    } else {
        tracing::warn!("{}", message);
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
