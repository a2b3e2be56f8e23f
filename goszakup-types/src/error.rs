use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the goszakup workspace.
///
/// Every upstream client, middleware layer, and orchestrator returns this type so that
/// callers (the bot, the CLI, a future HTTP facade) only ever need to match on one enum.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GoszakupError {
    /// The request itself is malformed: bad filter combination, empty keyword, etc.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upstream rejected our credentials, or no API key/token was configured.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller exceeded the locally enforced request rate.
    #[error("rate limited: limit={limit} window_ms={window_ms}")]
    RateLimited {
        /// Allowed number of requests in the window.
        limit: u64,
        /// Window length in milliseconds.
        window_ms: u64,
    },

    /// A transport-level failure talking to an upstream (connection refused, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The upstream responded but the payload did not match the expected wire shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The requested resource does not exist upstream.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "lot 123/45".
        what: String,
    },

    /// An individual upstream call, or the whole request, exceeded its deadline.
    #[error("timed out: {capability}")]
    Timeout {
        /// Label for what timed out, e.g. "rest-v3" or "search".
        capability: String,
    },

    /// Anything else: bugs, I/O failures unrelated to a specific upstream, etc.
    #[error("internal error: {0}")]
    Internal(String),

    /// All eligible upstream clients failed; contains the individual failures in
    /// the order they were attempted.
    #[error("all upstreams failed: {0:?}")]
    AllUpstreamsFailed(Vec<GoszakupError>),

    /// The per-key quota budget enforced by the billing service is exhausted.
    #[error("quota exceeded: remaining={remaining} reset_in_ms={reset_in_ms}")]
    QuotaExceeded {
        /// Remaining units at the time of rejection.
        remaining: u64,
        /// Milliseconds until the quota window resets.
        reset_in_ms: u64,
    },

    /// An upstream client is temporarily blacklisted by middleware after repeated failures.
    #[error("temporarily blacklisted: reset_in_ms={reset_in_ms}")]
    TemporarilyBlacklisted {
        /// Milliseconds remaining until the cool-down elapses.
        reset_in_ms: u64,
    },
}

impl GoszakupError {
    /// Helper: build a `Validation` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Helper: build a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Timeout` error.
    pub fn timeout(capability: impl Into<String>) -> Self {
        Self::Timeout {
            capability: capability.into(),
        }
    }

    /// Helper: build a `Network` error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Helper: build a `Protocol` error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Rank used by [`GoszakupError::collapse`] when reducing a set of per-upstream
    /// failures to a single representative error. Lower is reported first.
    fn rank(&self) -> u8 {
        match self {
            Self::Unauthorized(_) => 0,
            Self::RateLimited { .. } | Self::QuotaExceeded { .. } => 1,
            Self::TemporarilyBlacklisted { .. } => 2,
            Self::Network(_) => 3,
            Self::Protocol(_) => 4,
            Self::Timeout { .. } => 5,
            Self::Validation(_) => 6,
            Self::NotFound { .. } => 7,
            Self::Internal(_) => 8,
            Self::AllUpstreamsFailed(_) => 9,
        }
    }

    /// Collapse a batch of per-upstream errors into one representative error.
    ///
    /// Ranking follows `Unauthorized > RateLimited/QuotaExceeded > Blacklisted >
    /// Network > Protocol > Timeout`, matching the order a caller should act on:
    /// fix credentials first, then back off, then treat it as a transient fault.
    /// Returns `Internal` if `errors` is empty.
    #[must_use]
    pub fn collapse(mut errors: Vec<Self>) -> Self {
        if errors.is_empty() {
            return Self::Internal("no upstream was attempted".to_string());
        }
        if errors.len() == 1 {
            return errors.pop().unwrap();
        }
        errors.sort_by_key(Self::rank);
        let best = errors[0].clone();
        if errors[1..].iter().all(|e| e.rank() > best.rank()) {
            return best;
        }
        if matches!(best, Self::NotFound { .. }) && errors.iter().all(|e| e.rank() == best.rank())
        {
            return best;
        }
        Self::AllUpstreamsFailed(errors)
    }

    /// Returns true if this error should be surfaced to end users as actionable,
    /// as opposed to a benign not-found condition.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::AllUpstreamsFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllUpstreamsFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllUpstreamsFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
