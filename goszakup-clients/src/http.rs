//! Shared transport and retry machinery for the upstream clients.
//!
//! Every client is built on a single `reqwest::Client`, constructed once per
//! process, so connection pooling is shared across clients.

use std::time::Duration;

use goszakup_types::{BackoffConfig, GoszakupError};
use rand::Rng;

/// Build the shared `reqwest::Client` used by every upstream client.
///
/// `ssl_verify = false` is a dev-only escape hatch (§6's `ssl_verify` flag);
/// it must never be the default in production.
pub fn build_shared_client(
    request_timeout: Duration,
    ssl_verify: bool,
) -> Result<reqwest::Client, GoszakupError> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .danger_accept_invalid_certs(!ssl_verify)
        .build()
        .map_err(|e| GoszakupError::Internal(format!("failed to build http client: {e}")))
}

/// Classify a transport failure, mapping it onto the shared error taxonomy.
pub fn map_reqwest_error(err: &reqwest::Error, label: &str) -> GoszakupError {
    if err.is_timeout() {
        return GoszakupError::timeout(label);
    }
    if let Some(status) = err.status() {
        return map_status(status, label);
    }
    GoszakupError::network(format!("{label}: {err}"))
}

fn map_status(status: reqwest::StatusCode, label: &str) -> GoszakupError {
    match status.as_u16() {
        401 | 403 => GoszakupError::Unauthorized(format!("{label}: http {status}")),
        429 => GoszakupError::RateLimited {
            limit: 0,
            window_ms: 60_000,
        },
        400..=499 => GoszakupError::Validation(format!("{label}: http {status}")),
        _ => GoszakupError::network(format!("{label}: http {status}")),
    }
}

/// True for failures worth retrying: transport-level network errors, 429,
/// and 5xx. Non-transient failures (400, 401, 403, malformed payloads) fail
/// fast instead.
#[must_use]
pub fn is_transient(err: &GoszakupError) -> bool {
    matches!(
        err,
        GoszakupError::Network(_) | GoszakupError::RateLimited { .. } | GoszakupError::Timeout { .. }
    )
}

/// Retry `attempt` up to `backoff.max_retries` times with exponential
/// backoff plus jitter, stopping early on a non-transient failure.
pub async fn retry_with_backoff<T, F, Fut>(
    backoff: &BackoffConfig,
    mut attempt: F,
) -> Result<T, GoszakupError>
where
    F: FnMut() -> Fut,
    Fut: core::future::Future<Output = Result<T, GoszakupError>>,
{
    let mut delay_ms = backoff.min_backoff_ms;
    let mut last_err = None;
    for try_num in 0..backoff.max_retries {
        match attempt().await {
            Ok(v) => return Ok(v),
            Err(e) if is_transient(&e) && try_num + 1 < backoff.max_retries => {
                last_err = Some(e);
                let jitter = rand::rng().random_range(0..=backoff.jitter_percent as u64);
                let jittered = delay_ms + (delay_ms * jitter / 100);
                tokio::time::sleep(Duration::from_millis(jittered.min(backoff.max_backoff_ms)))
                    .await;
                delay_ms = (delay_ms * u64::from(backoff.factor)).min(backoff.max_backoff_ms);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| GoszakupError::Internal("retry loop exhausted".to_string())))
}
