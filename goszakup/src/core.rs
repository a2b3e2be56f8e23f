//! Top-level `Goszakup` engine and its builder.

use std::sync::Arc;
use std::time::Duration;

use goszakup_clients::{build_shared_client, GqlV2Client, GqlV3Client, RestV3Client, WebhookClient};
use goszakup_core::UpstreamClient;
use goszakup_metrics::MetricsStore;
use goszakup_middleware::ClientBuilder;
use goszakup_types::{
    GoszakupConfig, GoszakupError, GoszakupMappings, LotResult, SearchQuery, SearchReport, SearchStrategy,
};

use crate::cache::SearchCache;
use crate::quota::{LocalRateLimiter, QuotaClient};
use crate::search::SearchOrchestrator;

/// The assembled procurement search engine: registered upstream clients
/// (each already wrapped with cache/blacklist middleware), the
/// orchestrator, and the rate/quota gate sitting in front of it.
pub struct Goszakup {
    orchestrator: SearchOrchestrator,
    rate_limiter: LocalRateLimiter,
    quota_client: Option<QuotaClient>,
}

impl Goszakup {
    /// Start building an engine from `config`.
    #[must_use]
    pub fn builder(config: GoszakupConfig) -> GoszakupBuilder {
        GoszakupBuilder::new(config)
    }

    /// Run a search on behalf of `user_id`, enforcing the rate/quota gate
    /// first. `api_key` is required only when a billing URL is configured.
    ///
    /// # Errors
    /// Returns [`GoszakupError::RateLimited`]/[`GoszakupError::QuotaExceeded`]
    /// if the gate rejects the call, or whatever the orchestrator surfaces.
    pub async fn search(
        &self,
        query: &SearchQuery,
        user_id: i64,
        api_key: Option<&str>,
        forced_strategy: Option<SearchStrategy>,
    ) -> Result<SearchReport, GoszakupError> {
        self.rate_limiter.check_search(user_id)?;
        if let (Some(quota), Some(key)) = (&self.quota_client, api_key) {
            quota.validate_key(key, "search", 1).await?;
        }
        let report = self.orchestrator.search(query, Some(user_id), forced_strategy).await?;
        if let (Some(quota), Some(key)) = (&self.quota_client, api_key) {
            quota.log_usage(key, "search", 1).await;
        }
        Ok(report)
    }

    /// Fetch a single lot by number. Not subject to the rate/quota gate,
    /// which only throttles filtered search.
    ///
    /// # Errors
    /// See [`SearchOrchestrator::get_lot_by_number`].
    pub async fn get_lot_by_number(&self, lot_number: &str) -> Result<Option<LotResult>, GoszakupError> {
        self.orchestrator.get_lot_by_number(lot_number).await
    }
}

/// Builder for [`Goszakup`]. Validates `config` and constructs every
/// network client before any of them is used.
pub struct GoszakupBuilder {
    config: GoszakupConfig,
    metrics_path: Option<std::path::PathBuf>,
}

impl GoszakupBuilder {
    /// Start a builder from `config`.
    #[must_use]
    pub const fn new(config: GoszakupConfig) -> Self {
        Self {
            config,
            metrics_path: None,
        }
    }

    /// Persist search metrics to a SQLite file at `path` instead of the
    /// default in-memory store.
    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    fn validate(&self) -> Result<(), GoszakupError> {
        if self.config.per_user_rpm == 0 {
            return Err(GoszakupError::validation("per_user_rpm must be greater than zero"));
        }
        if self.config.webhook_url.is_some()
            && self.config.gql_v2_token.is_none()
            && self.config.gql_v3_token.is_none()
        {
            return Err(GoszakupError::validation(
                "webhook_url was set but no other upstream client is configured to merge it with",
            ));
        }
        if self.config.gql_v2_token.is_none()
            && self.config.gql_v3_token.is_none()
            && self.config.webhook_url.is_none()
        {
            return Err(GoszakupError::validation(
                "at least one upstream client (gql_v2_token, gql_v3_token, or webhook_url) must be configured",
            ));
        }
        Ok(())
    }

    /// Construct the engine, building every configured network client and
    /// wiring it through caching and blacklist middleware.
    ///
    /// # Errors
    /// Returns [`GoszakupError::Validation`] if `config` is inconsistent, or
    /// if the shared HTTP transport or metrics store fails to initialize.
    pub fn build(self) -> Result<Goszakup, GoszakupError> {
        self.validate()?;
        let cfg = &self.config;

        let http = build_shared_client(cfg.request_timeout, cfg.ssl_verify)?;
        // Reuse the upstream backoff's own ceiling as the blacklist cool-down:
        // a client already judged unreliable enough to need the longest retry
        // delay is also the one that should sit out the longest.
        let blacklist_cooldown = Duration::from_millis(cfg.backoff.max_backoff_ms);
        let mappings = Arc::new(GoszakupMappings::bundled());

        let mut clients: Vec<Arc<dyn UpstreamClient>> = Vec::new();

        if let Some(token) = &cfg.gql_v2_token {
            let raw = Arc::new(GqlV2Client::new(
                http.clone(),
                cfg.api_base_url.clone(),
                token.clone(),
                cfg.backoff,
                mappings.clone(),
            ));
            clients.push(wrap(raw, cfg, blacklist_cooldown)?);
        }
        if let Some(token) = &cfg.gql_v3_token {
            let raw = Arc::new(GqlV3Client::new(
                http.clone(),
                cfg.api_base_url.clone(),
                token.clone(),
                cfg.backoff,
                mappings.clone(),
            ));
            clients.push(wrap(raw, cfg, blacklist_cooldown)?);

            let rest_raw = Arc::new(RestV3Client::new(
                http.clone(),
                cfg.api_base_url.clone(),
                token.clone(),
                cfg.backoff,
                mappings.clone(),
            ));
            clients.push(wrap(rest_raw, cfg, blacklist_cooldown)?);
        }
        if let Some(url) = &cfg.webhook_url {
            let raw = Arc::new(WebhookClient::new(http.clone(), url.clone(), cfg.backoff));
            clients.push(wrap(raw, cfg, blacklist_cooldown)?);
        }

        let cache = SearchCache::new(&goszakup_types::CacheConfig {
            search_ttl_ms: u64::try_from(cfg.cache_ttl.as_millis()).unwrap_or(u64::MAX),
            ..goszakup_types::CacheConfig::default()
        });

        let metrics = match &self.metrics_path {
            Some(path) => Some(Arc::new(MetricsStore::open(path)?)),
            None => Some(Arc::new(MetricsStore::in_memory()?)),
        };

        let orchestrator = SearchOrchestrator::new(
            clients,
            cache,
            metrics,
            cfg.request_timeout,
            cfg.orchestrator_envelope,
        );

        let rate_limiter = LocalRateLimiter::new(cfg.per_user_rpm);
        let quota_client = cfg
            .billing_url
            .clone()
            .map(|url| QuotaClient::new(http.clone(), url, cfg.quota_failure_policy));

        Ok(Goszakup {
            orchestrator,
            rate_limiter,
            quota_client,
        })
    }
}

fn wrap(
    raw: Arc<dyn UpstreamClient>,
    cfg: &GoszakupConfig,
    blacklist_cooldown: Duration,
) -> Result<Arc<dyn UpstreamClient>, GoszakupError> {
    ClientBuilder::new(raw)
        .with_cache(&goszakup_types::CacheConfig {
            search_ttl_ms: u64::try_from(cfg.cache_ttl.as_millis()).unwrap_or(u64::MAX),
            ..goszakup_types::CacheConfig::default()
        })
        .with_blacklist(blacklist_cooldown)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_zero_per_user_rpm() {
        let cfg = GoszakupConfig {
            gql_v2_token: Some("t".to_string()),
            per_user_rpm: 0,
            ..GoszakupConfig::default()
        };
        let err = Goszakup::builder(cfg).build().unwrap_err();
        assert!(matches!(err, GoszakupError::Validation(_)));
    }

    #[test]
    fn build_rejects_webhook_only_configuration() {
        let cfg = GoszakupConfig {
            webhook_url: Some("https://example.test/hook".to_string()),
            ..GoszakupConfig::default()
        };
        let err = Goszakup::builder(cfg).build().unwrap_err();
        assert!(matches!(err, GoszakupError::Validation(_)));
    }

    #[test]
    fn build_rejects_no_clients_configured() {
        let err = Goszakup::builder(GoszakupConfig::default()).build().unwrap_err();
        assert!(matches!(err, GoszakupError::Validation(_)));
    }

    #[test]
    fn build_succeeds_with_a_single_gql_v2_token() {
        let cfg = GoszakupConfig {
            gql_v2_token: Some("t".to_string()),
            ..GoszakupConfig::default()
        };
        assert!(Goszakup::builder(cfg).build().is_ok());
    }
}
