//! Goszakup orchestrates procurement lot search across multiple upstream
//! Kazakhstan public-procurement APIs.
//!
//! Overview
//! - Registers upstream clients (GraphQL v2, GraphQL v3, REST v3, an optional
//!   webhook relay) behind the shared `goszakup_core::UpstreamClient` contract.
//! - Classifies each query's complexity and picks a sequential fallback chain
//!   or a concurrent hybrid fan-out accordingly.
//! - Expands free-text keywords through rule-based Russian morphology so a
//!   search for one grammatical form also matches its declensions.
//! - Applies per-user rate limiting and, optionally, external per-key quota
//!   enforcement ahead of every search.
//! - Caches whole-search results and records every search as a metric row.
//!
//! Key behaviors and trade-offs
//! - Strategy selection:
//!   - Sequential: deterministic priority order, per-client timeout,
//!     aggregates errors; stops at the first client to return a non-empty
//!     result.
//!   - Hybrid: fans out to every configured client concurrently under one
//!     wall-clock envelope; most complete merge, higher request fanout.
//! - Morphological retry: when the primary query returns nothing and no
//!   client errored, expanded keyword variants are retried against the same
//!   plan in turn.
//! - Failure semantics: an empty result set is never an error; the
//!   orchestrator only fails when every attempted client errored outright.
#![warn(missing_docs)]

mod cache;
mod core;
mod quota;
mod search;
mod strategy;

pub use crate::cache::SearchCache;
pub use crate::core::{Goszakup, GoszakupBuilder};
pub use crate::quota::{LocalRateLimiter, QuotaClient};
pub use crate::search::SearchOrchestrator;
pub use crate::strategy::{select, select_forced, select_hybrid, strategy_for_source, Plan};

pub use goszakup_core::{CallContext, CallOrigin, Middleware, UpstreamClient};
pub use goszakup_metrics::MetricsStore;
pub use goszakup_middleware::{BlacklistMiddleware, CacheMiddleware, ClientBuilder};
pub use goszakup_morphology::{expand as expand_morphology, is_relevant, MorphologyAnalysis};

pub use goszakup_types::{
    AmountRange, BackoffConfig, CacheConfig, ClientKey, ClientTiming, CleanupReport, DateRange,
    Diagnostics, GoszakupConfig, GoszakupError, LotIdentity, LotResult, PopularSearch,
    QuotaFailurePolicy, QuotaState, SearchComplexity, SearchMetric, SearchQuery, SearchReport,
    SearchStrategy, Source, SystemStats, TopUser, UserAnalytics,
};
