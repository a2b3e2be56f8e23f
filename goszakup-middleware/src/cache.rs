//! Response-caching middleware keyed on normalized query/filters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use goszakup_core::{GoszakupError, Middleware, UpstreamClient};
use goszakup_types::{CacheConfig, ClientKey, LotResult, SearchQuery, Source};
use moka::future::Cache;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Cache key derived from the fields that affect a search's result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchKey {
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

impl From<&SearchQuery> for SearchKey {
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

/// Client middleware that caches search results and single-lot lookups.
pub struct CachingClient {
    inner: Arc<dyn UpstreamClient>,
    search: Cache<SearchKey, Arc<Vec<LotResult>>>,
    lot: Cache<String, Arc<Option<LotResult>>>,
}

impl CachingClient {
    /// Wrap `inner` with search/lot caches sized per `cfg`.
    #[must_use]
    pub fn new(inner: Arc<dyn UpstreamClient>, cfg: &CacheConfig) -> Self {
        Self {
            inner,
            search: Cache::builder()
                .max_capacity(cfg.search_max_entries)
                .time_to_live(Duration::from_millis(cfg.search_ttl_ms))
                .build(),
            lot: Cache::builder()
                .max_capacity(cfg.lot_max_entries)
                .time_to_live(Duration::from_millis(cfg.lot_ttl_ms))
                .build(),
        }
    }
}

#[async_trait]
impl UpstreamClient for CachingClient {
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
        self.inner.is_healthy()
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        let key = SearchKey::from(query);
        if let Some(hit) = self.search.get(&key).await {
            #[cfg(feature = "tracing")]
            debug!(target = "goszakup::middleware::cache", client = self.inner.name(), "search cache hit");
            return Ok((*hit).clone());
        }
        let results = self.inner.search_by_filters(query).await?;
        self.search.insert(key, Arc::new(results.clone())).await;
        Ok(results)
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        if let Some(hit) = self.lot.get(lot_number).await {
            return Ok((*hit).clone());
        }
        let result = self.inner.get_lot_by_number(lot_number).await?;
        self.lot
            .insert(lot_number.to_string(), Arc::new(result.clone()))
            .await;
        Ok(result)
    }
}

/// Middleware config for constructing a [`CachingClient`].
pub struct CacheMiddleware {
    cfg: CacheConfig,
}

impl CacheMiddleware {
    /// Build middleware applying `cfg`'s TTL/capacity to the wrapped client.
    #[must_use]
    pub const fn new(cfg: CacheConfig) -> Self {
        Self { cfg }
    }
}

impl Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn UpstreamClient>) -> Arc<dyn UpstreamClient> {
        Arc::new(CachingClient::new(inner, &self.cfg))
    }

    fn name(&self) -> &'static str {
        "CacheMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "search_ttl_ms": self.cfg.search_ttl_ms,
            "search_max_entries": self.cfg.search_max_entries,
            "lot_ttl_ms": self.cfg.lot_ttl_ms,
            "lot_max_entries": self.cfg.lot_max_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goszakup_mock::dynamic::{DynamicMockClient, MockBehavior};

    fn lot(lot_number: &str) -> LotResult {
        LotResult {
            lot_number: lot_number.to_string(),
            announcement_number: String::new(),
            lot_name: "Test lot".to_string(),
            description: String::new(),
            customer_name: String::new(),
            customer_bin: String::new(),
            amount: rust_decimal::Decimal::new(1000, 0),
            currency: "KZT".to_string(),
            quantity: rust_decimal::Decimal::ONE,
            trade_method: String::new(),
            status: String::new(),
            end_date: String::new(),
            url: String::new(),
            source: Source::GqlV2,
        }
    }

    #[tokio::test]
    async fn repeat_search_is_served_from_cache_without_hitting_inner() {
        let (inner, controller) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
        controller
            .set_search_behavior("crane", MockBehavior::Return(vec![lot("L-1")]))
            .await;

        let cached = CachingClient::new(inner, &CacheConfig::default());
        let mut query = SearchQuery {
            keyword: Some("crane".to_string()),
            ..Default::default()
        };
        query.normalize();

        let first = cached.search_by_filters(&query).await.unwrap();
        assert_eq!(first.len(), 1);

        controller
            .set_search_behavior("crane", MockBehavior::Fail(GoszakupError::network("down")))
            .await;

        let second = cached.search_by_filters(&query).await.unwrap();
        assert_eq!(second, first);
    }
}
