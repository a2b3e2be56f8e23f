//! The search orchestrator: normalizes a query, expands it morphologically,
//! picks a strategy, executes it against upstream clients, then merges,
//! dedupes, filters, ranks, caches, and records the outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use goszakup_core::{call_with_timeout, dedup_lots, sort_by_amount_desc, UpstreamClient};
use goszakup_metrics::MetricsStore;
use goszakup_types::{
    ClientTiming, Diagnostics, GoszakupError, LotResult, SearchMetric, SearchQuery, SearchReport,
    SearchStrategy,
};

use crate::cache::SearchCache;
use crate::strategy::{self, Plan};

/// Sequential fallback tries at most the primary candidate plus two more.
const MAX_SEQUENTIAL_ATTEMPTS: usize = 3;

/// Ties a search orchestration's pieces together: the registered clients,
/// the whole-search cache, an optional metrics sink, and the timeouts that
/// bound a single upstream call versus the whole request.
pub struct SearchOrchestrator {
    clients: Vec<Arc<dyn UpstreamClient>>,
    cache: SearchCache,
    metrics: Option<Arc<MetricsStore>>,
    request_timeout: Duration,
    envelope: Duration,
}

struct Execution {
    merged: Vec<LotResult>,
    per_client: Vec<ClientTiming>,
    errors: Vec<GoszakupError>,
}

impl SearchOrchestrator {
    /// Build an orchestrator over `clients`, already wrapped with whatever
    /// per-client middleware (caching, blacklisting) their builder applied.
    #[must_use]
    pub fn new(
        clients: Vec<Arc<dyn UpstreamClient>>,
        cache: SearchCache,
        metrics: Option<Arc<MetricsStore>>,
        request_timeout: Duration,
        envelope: Duration,
    ) -> Self {
        Self {
            clients,
            cache,
            metrics,
            request_timeout,
            envelope,
        }
    }

    /// Run the full search pipeline for `query` on behalf of `user_id`.
    /// `forced_strategy` overrides automatic selection (and bypasses the
    /// whole-search cache, since a forced strategy is a diagnostic request).
    ///
    /// # Errors
    /// Returns the worst collapsed [`GoszakupError`] only when every
    /// attempted client failed outright; an empty result set is never an
    /// error by itself.
    pub async fn search(
        &self,
        query: &SearchQuery,
        user_id: Option<i64>,
        forced_strategy: Option<SearchStrategy>,
    ) -> Result<SearchReport, GoszakupError> {
        if query.is_empty() {
            return Err(GoszakupError::validation(
                "search query must have a keyword or at least one filter",
            ));
        }

        let start = Instant::now();
        let mut query = query.clone();
        query.normalize();

        if forced_strategy.is_none() {
            if let Some(cached) = self.cache.get(&query).await {
                let report = SearchReport {
                    results: (*cached).clone(),
                    diagnostics: Diagnostics {
                        strategy: Some(SearchStrategy::Cache),
                        per_client: Vec::new(),
                        errors: Vec::new(),
                    },
                };
                self.log_metric(user_id, &query, &report, start.elapsed(), None);
                return Ok(report);
            }
        }

        let keyword_for_morphology = query
            .keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        let morphology = keyword_for_morphology.as_deref().map(goszakup_morphology::expand);

        let plan = match forced_strategy {
            None | Some(SearchStrategy::Auto) => strategy::select(&query, &self.clients),
            Some(s) => strategy::select_forced(s, &self.clients),
        };

        if plan.candidates().is_empty() {
            return Err(GoszakupError::validation(
                "no healthy upstream client is configured to serve this query",
            ));
        }

        let mut execution = match &plan {
            Plan::Sequential(candidates) => self.run_sequential(candidates, &query).await,
            Plan::Hybrid(candidates) => self.run_hybrid(candidates, &query).await,
        };

        // Morphological retry: if nothing came back and no error forced a
        // short-circuit, retry the same plan against each expanded variant
        // in turn until one yields a non-empty merge or the variants run out.
        if execution.merged.is_empty() && execution.errors.is_empty() {
            if let Some(analysis) = &morphology {
                for variant in analysis
                    .expanded_queries
                    .iter()
                    .filter(|v| Some(v.as_str()) != keyword_for_morphology.as_deref())
                {
                    let mut variant_query = query.clone();
                    variant_query.keyword = Some(variant.clone());
                    let retry = match &plan {
                        Plan::Sequential(candidates) => {
                            self.run_sequential(candidates, &variant_query).await
                        }
                        Plan::Hybrid(candidates) => self.run_hybrid(candidates, &variant_query).await,
                    };
                    let found = !retry.merged.is_empty();
                    execution.per_client.extend(retry.per_client);
                    execution.merged.extend(retry.merged);
                    execution.errors.extend(retry.errors);
                    if found {
                        break;
                    }
                }
            }
        }

        if execution.per_client.is_empty() && !execution.errors.is_empty() {
            let err = GoszakupError::collapse(execution.errors);
            self.log_failure(user_id, &query, start.elapsed(), &err);
            return Err(err);
        }

        let mut results = dedup_lots(execution.merged);

        if let Some(keyword) = &keyword_for_morphology {
            results.retain(|lot| goszakup_morphology::is_relevant(&lot.searchable_text(), keyword));
        }

        sort_by_amount_desc(&mut results);

        let offset = query.offset as usize;
        let limit = query.limit as usize;
        results = results.into_iter().skip(offset).take(limit).collect();

        if !results.is_empty() {
            self.cache.set(&query, Arc::new(results.clone())).await;
        }

        let used_strategy = match &plan {
            Plan::Hybrid(_) => SearchStrategy::Hybrid,
            Plan::Sequential(_) => execution
                .per_client
                .first()
                .map(|t| strategy::strategy_for_source(t.source))
                .unwrap_or(SearchStrategy::Auto),
        };

        let report = SearchReport {
            results,
            diagnostics: Diagnostics {
                strategy: Some(used_strategy),
                per_client: execution.per_client,
                errors: execution.errors,
            },
        };
        self.log_metric(user_id, &query, &report, start.elapsed(), None);
        Ok(report)
    }

    /// Fetch a single lot by number, trying every configured healthy client
    /// in registration order until one returns a hit.
    ///
    /// # Errors
    /// Returns the worst collapsed [`GoszakupError`] only if every attempted
    /// client failed; a lot absent from all of them is `Ok(None)`.
    pub async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        let mut errors = Vec::new();
        let mut attempted = 0usize;
        for client in self.clients.iter().filter(|c| c.is_healthy()) {
            attempted += 1;
            match call_with_timeout(client.name(), self.request_timeout, client.get_lot_by_number(lot_number))
                .await
            {
                Ok(Some(lot)) => return Ok(Some(lot)),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        if attempted > 0 && attempted == errors.len() {
            return Err(GoszakupError::collapse(errors));
        }
        Ok(None)
    }

    async fn run_sequential(&self, candidates: &[Arc<dyn UpstreamClient>], query: &SearchQuery) -> Execution {
        let mut merged = Vec::new();
        let mut per_client = Vec::new();
        let mut errors = Vec::new();

        for client in candidates.iter().take(MAX_SEQUENTIAL_ATTEMPTS) {
            let began = Instant::now();
            match call_with_timeout(client.name(), self.request_timeout, client.search_by_filters(query)).await {
                Ok(results) => {
                    per_client.push(ClientTiming {
                        source: client.source(),
                        elapsed_ms: u64::try_from(began.elapsed().as_millis()).unwrap_or(u64::MAX),
                        count: results.len(),
                    });
                    let had_results = !results.is_empty();
                    merged.extend(results);
                    if had_results {
                        break;
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        Execution { merged, per_client, errors }
    }

    async fn run_hybrid(&self, candidates: &[Arc<dyn UpstreamClient>], query: &SearchQuery) -> Execution {
        let request_timeout = self.request_timeout;
        let mut futs = FuturesUnordered::new();
        for client in candidates {
            let client = Arc::clone(client);
            let query = query.clone();
            futs.push(async move {
                let began = Instant::now();
                let result = call_with_timeout(client.name(), request_timeout, client.search_by_filters(&query)).await;
                (client.source(), began.elapsed(), result)
            });
        }

        let mut merged = Vec::new();
        let mut per_client = Vec::new();
        let mut errors = Vec::new();

        let drain = async {
            while let Some((source, elapsed, result)) = futs.next().await {
                match result {
                    Ok(results) => {
                        per_client.push(ClientTiming {
                            source,
                            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                            count: results.len(),
                        });
                        merged.extend(results);
                    }
                    Err(e) => errors.push(e),
                }
            }
        };
        // A timed-out envelope keeps whatever legs completed in time; it is
        // not itself surfaced as an error.
        let _ = tokio::time::timeout(self.envelope, drain).await;

        Execution { merged, per_client, errors }
    }

    fn log_metric(
        &self,
        user_id: Option<i64>,
        query: &SearchQuery,
        report: &SearchReport,
        elapsed: Duration,
        error: Option<&GoszakupError>,
    ) {
        let Some(store) = &self.metrics else { return };
        let metric = SearchMetric {
            user_id,
            query: query.keyword.clone().unwrap_or_default(),
            results_count: u32::try_from(report.results.len()).unwrap_or(u32::MAX),
            strategy_tag: report
                .diagnostics
                .strategy
                .map_or_else(|| "auto".to_string(), |s| s.as_str().to_string()),
            exec_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            success: error.is_none(),
            error: error.map(ToString::to_string).unwrap_or_default(),
            timestamp: chrono::Utc::now(),
        };
        let _ = store.log(&metric);
    }

    fn log_failure(&self, user_id: Option<i64>, query: &SearchQuery, elapsed: Duration, err: &GoszakupError) {
        let Some(store) = &self.metrics else { return };
        let metric = SearchMetric {
            user_id,
            query: query.keyword.clone().unwrap_or_default(),
            results_count: 0,
            strategy_tag: "auto".to_string(),
            exec_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            success: false,
            error: err.to_string(),
            timestamp: chrono::Utc::now(),
        };
        let _ = store.log(&metric);
    }
}
