use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use goszakup_core::UpstreamClient;
use goszakup_types::{GoszakupError, LotResult, SearchQuery, Source};

/// Instruction for how a method should behave for a given key.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(GoszakupError),
    /// Hang (simulate a network stall; the orchestrator's own timeout is what
    /// ends the call, not this mock).
    Hang,
}

#[derive(Default)]
struct InternalState {
    search_rules: HashMap<String, MockBehavior<Vec<LotResult>>>,
    lot_rules: HashMap<String, MockBehavior<Option<LotResult>>>,
    default_search: Option<MockBehavior<Vec<LotResult>>>,
    search_requests: Vec<SearchQuery>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    healthy: Arc<AtomicBool>,
}

impl DynamicMockController {
    /// Set the behavior of `search_by_filters` when `query.keyword` equals `keyword`.
    pub async fn set_search_behavior(
        &self,
        keyword: impl Into<String>,
        behavior: MockBehavior<Vec<LotResult>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.search_rules.insert(keyword.into(), behavior);
    }

    /// Set the behavior of `search_by_filters` for queries with no matching rule.
    pub async fn set_default_search_behavior(&self, behavior: MockBehavior<Vec<LotResult>>) {
        let mut guard = self.state.lock().await;
        guard.default_search = Some(behavior);
    }

    /// Set the behavior of `get_lot_by_number` for a specific lot number.
    pub async fn set_lot_behavior(
        &self,
        lot_number: impl Into<String>,
        behavior: MockBehavior<Option<LotResult>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.lot_rules.insert(lot_number.into(), behavior);
    }

    /// Flip the health flag reported by `is_healthy`.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Return a copy of every query passed to `search_by_filters` so far.
    pub async fn search_requests(&self) -> Vec<SearchQuery> {
        let guard = self.state.lock().await;
        guard.search_requests.clone()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.search_rules.clear();
        guard.lot_rules.clear();
        guard.default_search = None;
        guard.search_requests.clear();
    }
}

/// An upstream client that defers all behavior to an external controller,
/// for tests that need per-case control over what a given client returns.
pub struct DynamicMockClient {
    name: &'static str,
    source: Source,
    state: Arc<Mutex<InternalState>>,
    healthy: Arc<AtomicBool>,
}

impl DynamicMockClient {
    /// Create a new dynamic mock client and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        source: Source,
    ) -> (Arc<dyn UpstreamClient>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let healthy = Arc::new(AtomicBool::new(true));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            healthy: Arc::clone(&healthy),
        };
        let me = Arc::new(Self {
            name,
            source,
            state,
            healthy,
        });
        (me as Arc<dyn UpstreamClient>, controller)
    }
}

#[async_trait]
impl UpstreamClient for DynamicMockClient {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> Source {
        self.source
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.search_requests.push(query.clone());
            let rule = query
                .keyword
                .as_deref()
                .and_then(|k| guard.search_rules.get(k).cloned());
            rule.or_else(|| guard.default_search.clone())
        };

        match behavior {
            Some(MockBehavior::Return(lots)) => Ok(lots),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(Vec::new()),
        }
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        let behavior = {
            let guard = self.state.lock().await;
            guard.lot_rules.get(lot_number).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(lot)) => Ok(lot),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(None),
        }
    }
}
