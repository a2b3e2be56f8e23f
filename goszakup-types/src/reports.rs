//! Report envelopes produced by the orchestrator and the metrics store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoszakupError;
use crate::lot::{LotResult, Source};
use crate::query::SearchStrategy;

/// Per-client timing and result count captured during a single orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTiming {
    /// Which client this entry is for.
    pub source: Source,
    /// Wall-clock time spent in this client's call.
    pub elapsed_ms: u64,
    /// Number of results this client contributed before merge/dedup.
    pub count: usize,
}

/// Diagnostic detail attached to every search response, win or lose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Strategy actually used to serve the request.
    pub strategy: Option<SearchStrategy>,
    /// Per-client timing and contribution counts.
    pub per_client: Vec<ClientTiming>,
    /// Non-fatal errors from clients that did not prevent a successful response.
    pub errors: Vec<GoszakupError>,
}

/// Summary of a search operation: the merged, deduped, ranked results plus
/// diagnostics describing how they were produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchReport {
    /// Final result list, already sorted and trimmed to the requested limit.
    pub results: Vec<LotResult>,
    /// Diagnostic detail for this request.
    pub diagnostics: Diagnostics,
}

/// A single append-only metrics row, one per completed orchestration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMetric {
    /// Identifier of the user who issued the search, if known.
    pub user_id: Option<i64>,
    /// The raw query string (keyword) that was searched.
    pub query: String,
    /// Number of results returned. Zero whenever `success` is false.
    pub results_count: u32,
    /// Strategy tag used to serve the request.
    pub strategy_tag: String,
    /// Wall-clock execution time in milliseconds.
    pub exec_ms: u64,
    /// Whether the orchestration completed successfully.
    pub success: bool,
    /// Error string when `success` is false, empty otherwise.
    pub error: String,
    /// When this metric was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A query ranked by popularity over a reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularSearch {
    /// The searched query string.
    pub query: String,
    /// Number of times it was searched in the window.
    pub count: u64,
    /// Most recent time it was searched.
    pub last_seen: DateTime<Utc>,
}

/// Per-user search analytics over a reporting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnalytics {
    /// The user this analytics snapshot is for.
    pub user_id: i64,
    /// Total number of searches in the window.
    pub total_searches: u64,
    /// Number of distinct query strings.
    pub distinct_queries: u64,
    /// The user's single most frequent query, if any.
    pub top_query: Option<String>,
    /// Average results count across successful searches.
    pub avg_results_count: f64,
    /// Most recent search timestamp.
    pub last_activity: Option<DateTime<Utc>>,
}

/// System-wide analytics over a reporting window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemStats {
    /// Total number of searches in the window.
    pub total_searches: u64,
    /// Number of distinct users.
    pub distinct_users: u64,
    /// Fraction of searches that succeeded, in `[0.0, 1.0]`.
    pub success_rate: f64,
    /// Distribution of searches by strategy tag.
    pub strategy_distribution: HashMap<String, u64>,
    /// Average execution latency across all searches.
    pub avg_latency_ms: f64,
}

/// A user ranked by total search volume over a reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUser {
    /// The user.
    pub user_id: i64,
    /// Total number of searches in the window.
    pub search_count: u64,
}

/// Outcome of a retention cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Number of rows deleted.
    pub deleted: u64,
    /// Store size in bytes before cleanup.
    pub size_before: u64,
    /// Store size in bytes after cleanup.
    pub size_after: u64,
}
