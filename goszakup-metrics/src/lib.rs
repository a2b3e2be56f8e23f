//! goszakup-metrics
//!
//! Append-only log of completed search orchestrations, backed by a local
//! SQLite file opened through `rusqlite`. Single-writer is enforced by
//! serializing every call through a [`std::sync::Mutex`] around the
//! connection, not a dedicated writer task — there is no actor/channel layer
//! elsewhere in this workspace for a metrics write to plug into, and a
//! short-lived lock per call is enough to satisfy "single writer, many
//! readers" without inventing one.
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use goszakup_types::{
    CleanupReport, GoszakupError, PopularSearch, SearchMetric, SystemStats, TopUser,
    UserAnalytics,
};
use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS search_metrics (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER,
    query         TEXT NOT NULL,
    results_count INTEGER NOT NULL,
    strategy_tag  TEXT NOT NULL,
    exec_ms       INTEGER NOT NULL,
    success       INTEGER NOT NULL,
    error         TEXT NOT NULL DEFAULT '',
    timestamp     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_search_metrics_user_id ON search_metrics(user_id);
CREATE INDEX IF NOT EXISTS idx_search_metrics_timestamp ON search_metrics(timestamp);
CREATE INDEX IF NOT EXISTS idx_search_metrics_query ON search_metrics(query);
";

/// Map a `rusqlite` failure onto the shared error taxonomy.
///
/// A free function rather than a `From` impl: `GoszakupError` lives in
/// `goszakup-types`, which stays free of storage dependencies, so
/// implementing the foreign `From` trait for it here would violate the
/// orphan rule. Mirrors `goszakup-clients::http::map_reqwest_error`.
fn map_sqlite_error(err: rusqlite::Error) -> GoszakupError {
    GoszakupError::Internal(format!("metrics store: {err}"))
}

/// Local SQLite-backed store for [`SearchMetric`] rows.
pub struct MetricsStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl MetricsStore {
    /// Open (or create) a metrics database at `path`.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] if the file cannot be opened or
    /// the schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GoszakupError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(map_sqlite_error)?;
        conn.execute_batch(SCHEMA).map_err(map_sqlite_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Open an in-memory store, for tests and short-lived processes.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self, GoszakupError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        conn.execute_batch(SCHEMA).map_err(map_sqlite_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append one metric row. O(1).
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn log(&self, metric: &SearchMetric) -> Result<(), GoszakupError> {
        self.lock()
            .execute(
                "INSERT INTO search_metrics
                    (user_id, query, results_count, strategy_tag, exec_ms, success, error, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    metric.user_id,
                    metric.query,
                    metric.results_count,
                    metric.strategy_tag,
                    metric.exec_ms,
                    metric.success,
                    metric.error,
                    metric.timestamp.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    fn since(days: u32) -> String {
        (Utc::now() - Duration::days(i64::from(days))).to_rfc3339()
    }

    /// Top `limit` queries by search count within the last `days` days.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn popular_queries(
        &self,
        days: u32,
        limit: u32,
    ) -> Result<Vec<PopularSearch>, GoszakupError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT query, COUNT(*) as cnt, MAX(timestamp) as last_seen
                 FROM search_metrics
                 WHERE timestamp >= ?1
                 GROUP BY query
                 ORDER BY cnt DESC, last_seen DESC
                 LIMIT ?2",
            )
            .map_err(map_sqlite_error)?;
        let rows = stmt
            .query_map(rusqlite::params![Self::since(days), limit], |row| {
                let last_seen: String = row.get(2)?;
                Ok(PopularSearch {
                    query: row.get(0)?,
                    count: row.get::<_, i64>(1)?.try_into().unwrap_or(0),
                    last_seen: parse_rfc3339(&last_seen),
                })
            })
            .map_err(map_sqlite_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite_error)
    }

    /// Per-user search analytics over the last `days` days.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn user_analytics(&self, user_id: i64, days: u32) -> Result<UserAnalytics, GoszakupError> {
        let conn = self.lock();
        let since = Self::since(days);

        let (total_searches, distinct_queries, last_activity): (i64, i64, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT query), MAX(timestamp)
                 FROM search_metrics WHERE user_id = ?1 AND timestamp >= ?2",
                rusqlite::params![user_id, since],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(map_sqlite_error)?;

        let top_query: Option<String> = conn
            .query_row(
                "SELECT query FROM search_metrics
                 WHERE user_id = ?1 AND timestamp >= ?2
                 GROUP BY query ORDER BY COUNT(*) DESC LIMIT 1",
                rusqlite::params![user_id, since],
                |row| row.get(0),
            )
            .ok();

        let avg_results_count: f64 = conn
            .query_row(
                "SELECT COALESCE(AVG(results_count), 0.0) FROM search_metrics
                 WHERE user_id = ?1 AND timestamp >= ?2 AND success = 1",
                rusqlite::params![user_id, since],
                |row| row.get(0),
            )
            .map_err(map_sqlite_error)?;

        Ok(UserAnalytics {
            user_id,
            total_searches: total_searches.try_into().unwrap_or(0),
            distinct_queries: distinct_queries.try_into().unwrap_or(0),
            top_query,
            avg_results_count,
            last_activity: last_activity.map(|s| parse_rfc3339(&s)),
        })
    }

    /// System-wide analytics over the last `days` days.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn system_stats(&self, days: u32) -> Result<SystemStats, GoszakupError> {
        let conn = self.lock();
        let since = Self::since(days);

        let (total_searches, distinct_users, success_rate, avg_latency_ms): (
            i64,
            i64,
            Option<f64>,
            Option<f64>,
        ) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(DISTINCT user_id), AVG(success), AVG(exec_ms)
                 FROM search_metrics WHERE timestamp >= ?1",
                rusqlite::params![since],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .map_err(map_sqlite_error)?;

        let mut stmt = conn
            .prepare(
                "SELECT strategy_tag, COUNT(*) FROM search_metrics
                 WHERE timestamp >= ?1 GROUP BY strategy_tag",
            )
            .map_err(map_sqlite_error)?;
        let distribution = stmt
            .query_map(rusqlite::params![since], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count.try_into().unwrap_or(0)))
            })
            .map_err(map_sqlite_error)?
            .collect::<Result<_, _>>()
            .map_err(map_sqlite_error)?;

        Ok(SystemStats {
            total_searches: total_searches.try_into().unwrap_or(0),
            distinct_users: distinct_users.try_into().unwrap_or(0),
            success_rate: success_rate.unwrap_or(0.0),
            strategy_distribution: distribution,
            avg_latency_ms: avg_latency_ms.unwrap_or(0.0),
        })
    }

    /// Top `limit` users by search volume over the last `days` days.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn top_users(&self, days: u32, limit: u32) -> Result<Vec<TopUser>, GoszakupError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT user_id, COUNT(*) as cnt FROM search_metrics
                 WHERE timestamp >= ?1 AND user_id IS NOT NULL
                 GROUP BY user_id ORDER BY cnt DESC LIMIT ?2",
            )
            .map_err(map_sqlite_error)?;
        let rows = stmt
            .query_map(rusqlite::params![Self::since(days), limit], |row| {
                let count: i64 = row.get(1)?;
                Ok(TopUser {
                    user_id: row.get(0)?,
                    search_count: count.try_into().unwrap_or(0),
                })
            })
            .map_err(map_sqlite_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite_error)
    }

    fn file_size(&self) -> u64 {
        self.path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map_or(0, |m| m.len())
    }

    /// Delete rows older than `retention_days` and vacuum storage.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn cleanup(&self, retention_days: u32) -> Result<CleanupReport, GoszakupError> {
        let size_before = self.file_size();
        let cutoff = Self::since(retention_days);
        let deleted = {
            let conn = self.lock();
            let deleted = conn
                .execute(
                    "DELETE FROM search_metrics WHERE timestamp < ?1",
                    rusqlite::params![cutoff],
                )
                .map_err(map_sqlite_error)?;
            conn.execute_batch("VACUUM").map_err(map_sqlite_error)?;
            deleted
        };
        Ok(CleanupReport {
            deleted: deleted.try_into().unwrap_or(0),
            size_before,
            size_after: self.file_size(),
        })
    }

    /// If the on-disk store exceeds `max_mb`, delete older rows in stages
    /// (60 days retention, then 30) until under budget. Returns `None` when
    /// no action was taken (including for an in-memory store, which has no
    /// meaningful on-disk size).
    ///
    /// # Errors
    /// Returns [`GoszakupError::Internal`] on a storage failure.
    pub fn auto_cleanup_by_size(
        &self,
        max_mb: u64,
    ) -> Result<Option<CleanupReport>, GoszakupError> {
        if self.path.is_none() {
            return Ok(None);
        }
        let budget_bytes = max_mb * 1024 * 1024;
        if self.file_size() <= budget_bytes {
            return Ok(None);
        }

        let mut last: Option<CleanupReport> = None;
        for stage_days in [60, 30] {
            let report = self.cleanup(stage_days)?;
            let still_over = report.size_after > budget_bytes;
            last = Some(report);
            if !still_over {
                break;
            }
        }
        Ok(last)
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(user_id: Option<i64>, query: &str, success: bool) -> SearchMetric {
        SearchMetric {
            user_id,
            query: query.to_string(),
            results_count: u32::from(success),
            strategy_tag: "gql_v2".to_string(),
            exec_ms: 42,
            success,
            error: if success { String::new() } else { "boom".to_string() },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn log_then_popular_queries_reflects_counts() {
        let store = MetricsStore::in_memory().unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();
        store.log(&metric(Some(2), "цемент", true)).unwrap();
        store.log(&metric(Some(1), "бумага", true)).unwrap();

        let popular = store.popular_queries(7, 10).unwrap();
        assert_eq!(popular[0].query, "цемент");
        assert_eq!(popular[0].count, 2);
    }

    #[test]
    fn user_analytics_aggregates_only_that_user() {
        let store = MetricsStore::in_memory().unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();
        store.log(&metric(Some(2), "сталь", true)).unwrap();

        let analytics = store.user_analytics(1, 7).unwrap();
        assert_eq!(analytics.total_searches, 2);
        assert_eq!(analytics.distinct_queries, 1);
        assert_eq!(analytics.top_query.as_deref(), Some("цемент"));
    }

    #[test]
    fn system_stats_reports_success_rate_and_distribution() {
        let store = MetricsStore::in_memory().unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();
        store.log(&metric(Some(1), "сталь", false)).unwrap();

        let stats = store.system_stats(7).unwrap();
        assert_eq!(stats.total_searches, 2);
        assert!((stats.success_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.strategy_distribution.get("gql_v2"), Some(&2));
    }

    #[test]
    fn cleanup_is_idempotent_on_second_call() {
        let store = MetricsStore::in_memory().unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();

        let first = store.cleanup(0).unwrap();
        assert_eq!(first.deleted, 1);
        let second = store.cleanup(0).unwrap();
        assert_eq!(second.deleted, 0);
    }

    #[test]
    fn auto_cleanup_on_in_memory_store_is_a_no_op() {
        let store = MetricsStore::in_memory().unwrap();
        store.log(&metric(Some(1), "цемент", true)).unwrap();
        assert!(store.auto_cleanup_by_size(0).unwrap().is_none());
    }
}
