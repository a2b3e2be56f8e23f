//! The `UpstreamClient` trait implemented by each procurement data source.

use async_trait::async_trait;
use goszakup_types::{ClientKey, GoszakupError, LotResult, SearchQuery, Source};

/// Why a call was issued, letting middleware distinguish a caller's own request
/// from a call the orchestrator issues internally as part of serving it (e.g. one
/// leg of a hybrid fan-out). Internal calls bypass per-caller blacklist/quota
/// accounting so a compositional fan-out cannot poison the budget twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrigin {
    /// A request originating outside the orchestrator: the bot, a CLI, an HTTP adapter.
    External,
    /// A call the orchestrator issues on its own behalf.
    Internal,
}

/// Context threaded through a single upstream call so middleware can make
/// origin- and operation-aware decisions without changing call signatures.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    operation: &'static str,
    origin: CallOrigin,
}

impl CallContext {
    /// Build a context for an externally originated call.
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            origin: CallOrigin::External,
        }
    }

    /// Build a context for a call the orchestrator issues internally.
    #[must_use]
    pub const fn internal(operation: &'static str) -> Self {
        Self {
            operation,
            origin: CallOrigin::Internal,
        }
    }

    /// The operation label, e.g. `"search_by_filters"` or `"get_lot_by_number"`.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Who issued this call.
    #[must_use]
    pub const fn origin(&self) -> CallOrigin {
        self.origin
    }
}

/// Implemented by each procurement data source: GraphQL v2, GraphQL v3, REST v3,
/// and the optional webhook relay. The orchestrator and strategy selector depend
/// only on this trait, never on a concrete client.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Stable identifier for priority lists and logs, e.g. `"gql-v2"`.
    fn name(&self) -> &'static str;

    /// Canonical client key constructed from the static name.
    fn key(&self) -> ClientKey {
        ClientKey::new(self.name())
    }

    /// Which [`Source`] tag this client stamps on the `LotResult`s it produces.
    fn source(&self) -> Source;

    /// Whether this client is currently considered healthy by the strategy
    /// selector. Defaults to `true`; middleware wrapping a client (blacklisting)
    /// overrides this to reflect cool-down state.
    fn is_healthy(&self) -> bool {
        true
    }

    /// Search for lots matching `query`. `query.limit` is already clamped to
    /// `[1, 100]` by the time a client sees it.
    ///
    /// # Errors
    /// Returns a [`GoszakupError`] on validation, network, protocol, or timeout
    /// failure. An empty result set is not an error.
    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError>;

    /// Fetch a single lot by its upstream-assigned number.
    ///
    /// # Errors
    /// Returns a [`GoszakupError`] on network/protocol/timeout failure. A lot
    /// that does not exist upstream is `Ok(None)`, not an error.
    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError>;
}
