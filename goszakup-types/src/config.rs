//! Configuration types shared across the orchestrator, clients, and middleware.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Snapshot of a quota budget returned by the external billing service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaState {
    /// Configured maximum units per window (a.k.a. `usage_limit`).
    pub limit: u64,
    /// Remaining units available in the current window.
    pub remaining: u64,
    /// Time remaining until the current window resets, if known.
    pub reset_in: Option<Duration>,
}

/// Exponential backoff configuration used when retrying a failed upstream call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum (base) backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
    /// Maximum number of retries before giving up.
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            factor: 2,
            jitter_percent: 20,
            max_retries: 3,
        }
    }
}

/// Capacity and TTL for the search/lot response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default entry lifetime for cached search result pages.
    pub search_ttl_ms: u64,
    /// Max number of distinct search-query cache entries held at once.
    pub search_max_entries: u64,
    /// Default entry lifetime for cached single-lot lookups.
    pub lot_ttl_ms: u64,
    /// Max number of distinct lot-lookup cache entries held at once.
    pub lot_max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_ms: 300_000,
            search_max_entries: 2_000,
            lot_ttl_ms: 300_000,
            lot_max_entries: 2_000,
        }
    }
}

/// Fail-open vs fail-closed policy applied when the external quota service is
/// unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaFailurePolicy {
    /// Reject the request if the billing service cannot be reached.
    FailClosed,
    /// Allow the request through if the billing service cannot be reached.
    FailOpen,
}

/// Global configuration for the `Goszakup` orchestrator.
///
/// Read once by the binary/integration entry point from environment or a config
/// file into this struct, then handed to [`crate::config`]'s consumer,
/// `GoszakupBuilder`. Library code never performs its own environment lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoszakupConfig {
    /// Base URL shared by the GQL v2, GQL v3, and REST v3 clients, which
    /// differ only in path (`/v2/graphql`, `/v3/graphql`, `/v3/lots`).
    pub api_base_url: String,
    /// Bearer token for GraphQL v2. Absent disables that client.
    pub gql_v2_token: Option<String>,
    /// Bearer token for GraphQL v3. Absent disables GQL v3 and REST v3 clients
    /// (they share credentials upstream).
    pub gql_v3_token: Option<String>,
    /// Base URL for the webhook relay. Absent disables it.
    pub webhook_url: Option<String>,
    /// Base URL for the external billing/quota service.
    pub billing_url: Option<String>,
    /// Per-upstream-call wall clock timeout.
    pub request_timeout: Duration,
    /// Total per-request budget for the orchestrator's hybrid fan-out.
    pub orchestrator_envelope: Duration,
    /// Default cache entry TTL.
    pub cache_ttl: Duration,
    /// Per-user requests-per-minute budget for the in-process sliding window.
    pub per_user_rpm: u32,
    /// Days of metrics history to retain.
    pub metrics_retention_days: u32,
    /// On-disk metrics store size, in megabytes, that triggers auto-eviction.
    pub metrics_max_size_mb: u64,
    /// Whether upstream TLS certificates are verified. Disabling this requires
    /// an explicit dev flag and must never be the default in production.
    pub ssl_verify: bool,
    /// Policy applied when the billing service is unreachable.
    pub quota_failure_policy: QuotaFailurePolicy,
    /// Backoff applied to retried upstream network failures.
    pub backoff: BackoffConfig,
}

impl Default for GoszakupConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://ows.goszakup.gov.kz".to_string(),
            gql_v2_token: None,
            gql_v3_token: None,
            webhook_url: None,
            billing_url: None,
            request_timeout: Duration::from_secs(30),
            orchestrator_envelope: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            per_user_rpm: 30,
            metrics_retention_days: 90,
            metrics_max_size_mb: 100,
            ssl_verify: true,
            quota_failure_policy: QuotaFailurePolicy::FailClosed,
            backoff: BackoffConfig::default(),
        }
    }
}
