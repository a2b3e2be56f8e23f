//! Blacklisting middleware that temporarily gates a client after rate-limit signals.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use goszakup_core::{GoszakupError, Middleware, UpstreamClient};
use goszakup_types::{ClientKey, LotResult, SearchQuery, Source};

/// Middleware that blacklists its inner client for a period upon quota exhaustion.
pub struct BlacklistClient {
    inner: Arc<dyn UpstreamClient>,
    state: Mutex<Option<Instant>>, // blacklist-until; None means active
    default_duration: Duration,
}

impl BlacklistClient {
    /// Wrap `inner` with a cool-down of `default_duration` used when an upstream
    /// doesn't report its own retry-after window.
    #[must_use]
    pub fn new(inner: Arc<dyn UpstreamClient>, default_duration: Duration) -> Self {
        Self {
            inner,
            state: Mutex::new(None),
            default_duration,
        }
    }

    fn blacklist_remaining_ms(&self) -> Option<u64> {
        let mut guard = self.state.lock().expect("mutex poisoned");
        let now = Instant::now();
        if let Some(until) = *guard {
            if now < until {
                let remaining = until.saturating_duration_since(now);
                let ms: u64 = remaining.as_millis().try_into().unwrap_or(u64::MAX);
                return Some(ms.max(1));
            }
            *guard = None;
        }
        None
    }

    fn blacklist_until(&self, until: Instant) {
        let mut guard = self.state.lock().expect("mutex poisoned");
        *guard = Some(until);
    }

    fn handle_error(&self, err: GoszakupError) -> GoszakupError {
        if let GoszakupError::RateLimited { window_ms, .. } = err.clone() {
            let duration = if window_ms > 0 {
                Duration::from_millis(window_ms)
            } else {
                self.default_duration
            };
            self.blacklist_until(Instant::now() + duration);
        }
        err
    }
}

#[async_trait]
impl UpstreamClient for BlacklistClient {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn key(&self) -> ClientKey {
        self.inner.key()
    }

    fn source(&self) -> Source {
        self.inner.source()
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy() && self.blacklist_remaining_ms().is_none()
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        if let Some(ms) = self.blacklist_remaining_ms() {
            return Err(GoszakupError::TemporarilyBlacklisted { reset_in_ms: ms });
        }
        self.inner
            .search_by_filters(query)
            .await
            .map_err(|e| self.handle_error(e))
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        if let Some(ms) = self.blacklist_remaining_ms() {
            return Err(GoszakupError::TemporarilyBlacklisted { reset_in_ms: ms });
        }
        self.inner
            .get_lot_by_number(lot_number)
            .await
            .map_err(|e| self.handle_error(e))
    }
}

/// Middleware config for constructing a [`BlacklistClient`].
pub struct BlacklistMiddleware {
    /// Cool-down applied when an upstream doesn't report its own retry-after.
    pub duration: Duration,
}

impl BlacklistMiddleware {
    /// Build middleware that applies `duration` as its default cool-down.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Middleware for BlacklistMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn UpstreamClient>) -> Arc<dyn UpstreamClient> {
        Arc::new(BlacklistClient::new(inner, self.duration))
    }

    fn name(&self) -> &'static str {
        "BlacklistMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "default_duration_ms": self.duration.as_millis(),
        })
    }
}
