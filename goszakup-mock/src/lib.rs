//! Mock upstream clients for CI-safe tests and examples.
//!
//! [`MockClient`] serves deterministic fixture data and honors a small
//! "magic lot number" convention (`"FAIL"`/`"TIMEOUT"`) for forcing failure
//! paths without a controller. [`DynamicMockClient`] hands control to an
//! external [`DynamicMockController`] for tests that need per-case behavior.

/// Controller-driven mock client for per-test behavior injection.
pub mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockClient, DynamicMockController, MockBehavior};

use async_trait::async_trait;
use std::time::Duration;

use goszakup_core::UpstreamClient;
use goszakup_types::{GoszakupError, LotResult, SearchQuery, Source};

/// Mock upstream client backed by static fixtures, for examples and tests
/// that don't need per-case control.
pub struct MockClient {
    name: &'static str,
    source: Source,
}

impl MockClient {
    /// Create a mock client reporting the given `source`.
    #[must_use]
    pub const fn new(name: &'static str, source: Source) -> Self {
        Self { name, source }
    }

    fn maybe_fail_or_timeout(keyword: &str, operation: &'static str) -> Result<(), GoszakupError> {
        match keyword {
            "FAIL" => Err(GoszakupError::network(format!(
                "forced failure: {operation}"
            ))),
            "TIMEOUT" => {
                // Short synthetic latency; callers with a tight deadline will
                // still observe a timeout from the orchestrator's own clock.
                std::thread::sleep(Duration::from_millis(200));
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UpstreamClient for MockClient {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> Source {
        self.source
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        if let Some(keyword) = query.keyword.as_deref() {
            Self::maybe_fail_or_timeout(keyword, "search_by_filters")?;
        }
        Ok(fixtures::search(query, self.source))
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        Self::maybe_fail_or_timeout(lot_number, "get_lot_by_number")?;
        Ok(fixtures::by_lot_number(lot_number, self.source))
    }
}
