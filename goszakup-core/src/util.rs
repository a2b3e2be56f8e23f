//! Timeout and deadline helpers shared by the search orchestrator and clients.

use std::time::Duration;

use goszakup_types::GoszakupError;

/// Wrap an upstream call future with a timeout, mapping elapsed deadlines to
/// [`GoszakupError::Timeout`].
pub async fn call_with_timeout<T, Fut>(
    label: &'static str,
    timeout: Duration,
    fut: Fut,
) -> Result<T, GoszakupError>
where
    Fut: core::future::Future<Output = Result<T, GoszakupError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or_else(|_| Err(GoszakupError::timeout(label)))
}

/// Apply an optional overall deadline to a future, mapping elapsed deadlines to
/// [`GoszakupError::Timeout`]. With `deadline: None`, the future runs unbounded.
pub async fn with_deadline<T>(
    label: &'static str,
    deadline: Option<Duration>,
    fut: impl core::future::Future<Output = T>,
) -> Result<T, GoszakupError> {
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| GoszakupError::timeout(label)),
        None => Ok(fut.await),
    }
}
