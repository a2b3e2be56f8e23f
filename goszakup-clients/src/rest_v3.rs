use std::sync::Arc;

use async_trait::async_trait;

use goszakup_core::UpstreamClient;
use goszakup_types::{BackoffConfig, ClientKey, GoszakupError, GoszakupMappings, LotResult, SearchQuery, Source};

use crate::filter::build_rest_params;
use crate::http::{map_reqwest_error, retry_with_backoff};
use crate::mapping::extract_rest_lots;

/// REST v3 upstream client.
pub struct RestV3Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
    backoff: BackoffConfig,
    mappings: Arc<GoszakupMappings>,
}

impl RestV3Client {
    /// Static client key for strategy-selector priority configuration.
    pub const KEY: ClientKey = ClientKey::new("rest_v3");

    /// Build a client sharing the given `http` transport.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        token: String,
        backoff: BackoffConfig,
        mappings: Arc<GoszakupMappings>,
    ) -> Self {
        Self {
            http,
            base_url,
            token,
            backoff,
            mappings,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/lots", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl UpstreamClient for RestV3Client {
    fn name(&self) -> &'static str {
        "rest_v3"
    }

    fn source(&self) -> Source {
        Source::RestV3
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        let params = build_rest_params(query);
        let body = retry_with_backoff(&self.backoff, || async {
            let resp = self
                .http
                .get(self.endpoint())
                .bearer_auth(&self.token)
                .query(&params)
                .send()
                .await
                .map_err(|e| map_reqwest_error(&e, "rest_v3"))?;

            let resp = resp
                .error_for_status()
                .map_err(|e| map_reqwest_error(&e, "rest_v3"))?;

            resp.json::<serde_json::Value>()
                .await
                .map_err(|e| GoszakupError::protocol(format!("rest_v3: {e}")))
        })
        .await?;

        Ok(extract_rest_lots(&body)
            .into_iter()
            .map(|l| l.into_result(Source::RestV3, &self.mappings))
            .collect())
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        let mut query = SearchQuery {
            keyword: Some(lot_number.to_string()),
            limit: 100,
            ..Default::default()
        };
        query.normalize();
        let lots = self.search_by_filters(&query).await?;
        Ok(lots.into_iter().find(|l| l.lot_number == lot_number))
    }
}
