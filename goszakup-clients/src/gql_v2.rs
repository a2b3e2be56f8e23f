use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use goszakup_core::UpstreamClient;
use goszakup_types::{BackoffConfig, ClientKey, GoszakupError, GoszakupMappings, LotResult, SearchQuery, Source};

use crate::filter::{build_gql_filter, build_gql_lot_number_filter};
use crate::gql::post_graphql;

const LOTS_QUERY: &str = r"
query Lots($filter: LotsFilterInput, $limit: Int, $offset: Int) {
  lots(filter: $filter, limit: $limit, offset: $offset) {
    lotNumber
    nameDescriptionRu
    descriptionRu
    customerBin
    customerNameRu
    amount
    count
    endDate
    refLotStatusId
    refTradeMethodsId
    TrdBuy { numberAnno }
    RefLotsStatus { nameRu }
    RefTradeMethods { nameRu }
  }
}";

/// GraphQL v2 upstream client.
pub struct GqlV2Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
    backoff: BackoffConfig,
    mappings: Arc<GoszakupMappings>,
}

impl GqlV2Client {
    /// Static client key for strategy-selector priority configuration.
    pub const KEY: ClientKey = ClientKey::new("gql_v2");

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
        format!("{}/v2/graphql", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl UpstreamClient for GqlV2Client {
    fn name(&self) -> &'static str {
        "gql_v2"
    }

    fn source(&self) -> Source {
        Source::GqlV2
    }

    async fn search_by_filters(&self, query: &SearchQuery) -> Result<Vec<LotResult>, GoszakupError> {
        let filter = build_gql_filter(query, false);
        let variables = json!({ "filter": filter, "limit": query.limit, "offset": query.offset });
        let envelope = post_graphql(
            &self.http,
            &self.endpoint(),
            &self.token,
            "gql_v2",
            LOTS_QUERY,
            variables,
            &self.backoff,
        )
        .await?;
        let lots = envelope.data.map(|d| d.lots).unwrap_or_default();
        Ok(lots
            .into_iter()
            .map(|l| l.into_result(Source::GqlV2, &self.mappings))
            .collect())
    }

    async fn get_lot_by_number(
        &self,
        lot_number: &str,
    ) -> Result<Option<LotResult>, GoszakupError> {
        let filter = build_gql_lot_number_filter(lot_number);
        let variables = json!({ "filter": filter, "limit": 1, "offset": 0 });
        let envelope = post_graphql(
            &self.http,
            &self.endpoint(),
            &self.token,
            "gql_v2",
            LOTS_QUERY,
            variables,
            &self.backoff,
        )
        .await?;
        let lots = envelope.data.map(|d| d.lots).unwrap_or_default();
        Ok(lots
            .into_iter()
            .map(|l| l.into_result(Source::GqlV2, &self.mappings))
            .find(|l| l.lot_number == lot_number))
    }
}
