//! Orchestrator-level result cache.
//!
//! Distinct in purpose from [`goszakup_middleware::CachingClient`]: that
//! layer caches one upstream client's raw response, while this cache stores
//! the merged, deduped, ranked output of an entire search across whichever
//! clients a strategy fanned out to. A miss here can still hit at the
//! per-client layer if a different strategy reuses the same client.

use std::sync::Arc;
use std::time::Duration;

use goszakup_types::{CacheConfig, LotResult, SearchQuery};
use moka::future::Cache;

/// Cache key built from every field that affects a search's result set,
/// normalized so equivalent queries collide regardless of input ordering.
/// Grounded on `goszakup-middleware::cache::SearchKey`'s normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchCacheKey {
    keyword: Option<String>,
    customer_bin: Option<String>,
    customer_name: Option<String>,
    trade_method_ids: Vec<u32>,
    status_ids: Vec<u32>,
    amount_range: Option<(String, String)>,
    announcement_number: Option<String>,
    publish_date: (Option<i32>, Option<i32>),
    end_date: (Option<i32>, Option<i32>),
    region_codes: Vec<String>,
    limit: u32,
    offset: u32,
}

impl From<&SearchQuery> for SearchCacheKey {
    fn from(q: &SearchQuery) -> Self {
        Self {
            keyword: q.keyword.as_ref().map(|s| s.to_lowercase()),
            customer_bin: q.customer_bin.clone(),
            customer_name: q.customer_name.as_ref().map(|s| s.to_lowercase()),
            trade_method_ids: {
                let mut v = q.trade_method_ids.clone();
                v.sort_unstable();
                v
            },
            status_ids: {
                let mut v = q.status_ids.clone();
                v.sort_unstable();
                v
            },
            amount_range: q
                .amount_range
                .map(|r| (r.min.normalize().to_string(), r.max.normalize().to_string())),
            announcement_number: q.announcement_number.clone(),
            publish_date: (
                q.publish_date.from.map(|d| d.num_days_from_ce()),
                q.publish_date.to.map(|d| d.num_days_from_ce()),
            ),
            end_date: (
                q.end_date.from.map(|d| d.num_days_from_ce()),
                q.end_date.to.map(|d| d.num_days_from_ce()),
            ),
            region_codes: {
                let mut v = q.region_codes.clone();
                v.sort_unstable();
                v
            },
            limit: q.limit,
            offset: q.offset,
        }
    }
}

/// Whole-search result cache keyed on normalized query + filters.
pub struct SearchCache {
    inner: Cache<SearchCacheKey, Arc<Vec<LotResult>>>,
}

impl SearchCache {
    /// Build a cache sized and TTL'd per `cfg`.
    #[must_use]
    pub fn new(cfg: &CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(cfg.search_max_entries)
                .time_to_live(Duration::from_millis(cfg.search_ttl_ms))
                .build(),
        }
    }

    /// Look up a previously cached result set for `query`.
    pub async fn get(&self, query: &SearchQuery) -> Option<Arc<Vec<LotResult>>> {
        self.inner.get(&SearchCacheKey::from(query)).await
    }

    /// Cache `results` for `query`. Callers should only store non-empty
    /// result sets (step 10 of the orchestration pipeline).
    pub async fn set(&self, query: &SearchQuery, results: Arc<Vec<LotResult>>) {
        self.inner.insert(SearchCacheKey::from(query), results).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goszakup_types::Source;
    use rust_decimal::Decimal;

    fn lot() -> LotResult {
        LotResult {
            lot_number: "L-1".to_string(),
            announcement_number: String::new(),
            lot_name: "lot".to_string(),
            description: String::new(),
            customer_name: String::new(),
            customer_bin: String::new(),
            amount: Decimal::ONE,
            currency: "KZT".to_string(),
            quantity: Decimal::ONE,
            trade_method: String::new(),
            status: String::new(),
            end_date: String::new(),
            url: String::new(),
            source: Source::GqlV2,
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = SearchCache::new(&CacheConfig::default());
        let mut query = SearchQuery {
            keyword: Some("Цемент".to_string()),
            ..Default::default()
        };
        query.normalize();

        assert!(cache.get(&query).await.is_none());
        cache.set(&query, Arc::new(vec![lot()])).await;
        assert_eq!(cache.get(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn keyword_casing_does_not_affect_the_cache_key() {
        let cache = SearchCache::new(&CacheConfig::default());
        let mut lower = SearchQuery {
            keyword: Some("цемент".to_string()),
            ..Default::default()
        };
        lower.normalize();
        cache.set(&lower, Arc::new(vec![lot()])).await;

        let mut upper = SearchQuery {
            keyword: Some("ЦЕМЕНТ".to_string()),
            ..Default::default()
        };
        upper.normalize();
        assert!(cache.get(&upper).await.is_some());
    }
}
