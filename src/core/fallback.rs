//! Fast-fallback loading: race a fetch against a deadline and substitute
//! static data when the fetch loses or fails.

use crate::domain::model::LoadResult;
use crate::utils::error::ApiError;
use futures::future::{self, BoxFuture};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;

/// One entry for [`load_multiple`].
pub struct LoadConfig<'a, T> {
    pub label: String,
    pub operation: BoxFuture<'a, Result<T, ApiError>>,
    pub fallback: T,
    pub timeout: Duration,
}

impl<'a, T> LoadConfig<'a, T> {
    pub fn new<F>(label: impl Into<String>, operation: F, fallback: T, timeout: Duration) -> Self
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'a,
    {
        Self {
            label: label.into(),
            operation: Box::pin(operation),
            fallback,
            timeout,
        }
    }
}

/// Resolves to the operation's value if it succeeds within `timeout`,
/// otherwise to `fallback`. Never fails.
///
/// When the deadline wins, the operation future is dropped, so its result
/// can no longer reach the caller.
pub async fn load_with_fallback<T, E, Fut>(
    operation: Fut,
    fallback: T,
    timeout: Duration,
) -> LoadResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    labelled_load("operation", operation, fallback, timeout).await
}

async fn labelled_load<T, E, Fut>(
    label: &str,
    operation: Fut,
    fallback: T,
    timeout: Duration,
) -> LoadResult<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(Ok(data)) => LoadResult::api(data),
        Ok(Err(error)) => {
            tracing::debug!("{} failed, using fallback: {}", label, error);
            LoadResult::fallback(fallback)
        }
        Err(_) => {
            tracing::debug!("{} exceeded {:?}, using fallback", label, timeout);
            LoadResult::fallback(fallback)
        }
    }
}

/// Runs every config concurrently and resolves once all have settled.
/// The output order matches the input order.
pub async fn load_multiple<T>(configs: Vec<LoadConfig<'_, T>>) -> Vec<LoadResult<T>> {
    let loads = configs.into_iter().map(|config| async move {
        labelled_load(&config.label, config.operation, config.fallback, config.timeout).await
    });
    future::join_all(loads).await
}

/// Fallback now, live data later.
///
/// `initial` is available immediately; the live value is delivered at most
/// once through [`ProgressiveLoad::next_update`]. Dropping the handle cancels
/// the background fetch.
pub struct ProgressiveLoad<T> {
    pub initial: LoadResult<T>,
    update: oneshot::Receiver<T>,
}

impl<T> ProgressiveLoad<T> {
    /// Waits for the live value. `None` if the fetch failed or timed out.
    pub async fn next_update(self) -> Option<LoadResult<T>> {
        self.update.await.ok().map(LoadResult::api)
    }
}

pub fn load_progressive<T, E, Fut>(
    operation: Fut,
    fallback: T,
    timeout: Duration,
) -> ProgressiveLoad<T>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let (mut tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("Progressive load abandoned before completion");
            }
            outcome = tokio::time::timeout(timeout, operation) => match outcome {
                Ok(Ok(data)) => {
                    let _ = tx.send(data);
                }
                Ok(Err(error)) => tracing::debug!("Progressive load failed: {}", error),
                Err(_) => tracing::debug!("Progressive load exceeded {:?}", timeout),
            },
        }
    });

    ProgressiveLoad {
        initial: LoadResult::fallback(fallback),
        update: rx,
    }
}
