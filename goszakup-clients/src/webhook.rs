use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use goszakup_core::UpstreamClient;
use goszakup_types::{BackoffConfig, ClientKey, GoszakupError, LotResult, SearchQuery, Source};

use crate::http::{map_reqwest_error, retry_with_backoff};

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(default)]
    results: Vec<LotResult>,
}

/// Optional webhook relay client. POSTs `{query, normalized_query, limit}`
/// and expects `{results: [...]}` already shaped like [`LotResult`]. Results
/// are accepted verbatim but still pass dedup and relevance filtering
/// downstream in the orchestrator.
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    backoff: BackoffConfig,
}

impl WebhookClient {
    /// Static client key for strategy-selector priority configuration.
    pub const KEY: ClientKey = ClientKey::new("webhook");

    /// Build a client sharing the given `http` transport.
    #[must_use]
    pub fn new(http: reqwest::Client, url: String, backoff: BackoffConfig) -> Self {
        Self { http, url, backoff }
    }
}

#[async_trait]
impl UpstreamClient for WebhookClient {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn source(&self) -> Source {
        Source::Webhook
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        let keyword = query.keyword.clone().unwrap_or_default();
        let body = json!({
            "query": keyword,
            "normalized_query": keyword.to_lowercase(),
            "limit": query.limit,
        });
        let envelope = retry_with_backoff(&self.backoff, || async {
            let resp = self
                .http
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .map_err(|e| map_reqwest_error(&e, "webhook"))?;
            let resp = resp
                .error_for_status()
                .map_err(|e| map_reqwest_error(&e, "webhook"))?;
            resp.json::<WebhookEnvelope>()
                .await
                .map_err(|e| GoszakupError::protocol(format!("webhook: {e}")))
        })
        .await?;

        Ok(envelope
            .results
            .into_iter()
            .map(|mut lot| {
                lot.source = Source::Webhook;
                lot
            })
            .collect())
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        let query = SearchQuery {
            keyword: Some(lot_number.to_string()),
            limit: 100,
            ..Default::default()
        };
        let lots = self.search_by_filters(&query).await?;
        Ok(lots.into_iter().find(|l| l.lot_number == lot_number))
    }
}
