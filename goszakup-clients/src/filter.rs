//! Translation of a [`SearchQuery`] into each protocol's native filter shape.

use serde_json::{Map, Value, json};

use goszakup_types::SearchQuery;

/// Build the GraphQL filter variable. `with_dates` adds the v3-only
/// `publishDateFrom/To`/`endDateFrom/To` fields.
#[must_use]
pub fn build_gql_filter(query: &SearchQuery, with_dates: bool) -> Value {
    let mut filter = Map::new();
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("nameDescriptionRu".to_string(), json!(keyword));
    }
    if let Some(bin) = query.customer_bin.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("customerBin".to_string(), json!(bin));
    }
    if let Some(name) = query.customer_name.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("customerNameRu".to_string(), json!(name));
    }
    if let Some(id) = query.status_ids.first() {
        filter.insert("refLotStatusId".to_string(), json!(id));
    }
    if let Some(id) = query.trade_method_ids.first() {
        filter.insert("refTradeMethodsId".to_string(), json!(id));
    }
    if let Some(range) = &query.amount_range {
        filter.insert("amountFrom".to_string(), json!(range.min.to_string()));
        filter.insert("amountTo".to_string(), json!(range.max.to_string()));
    }
    if let Some(number) = query
        .announcement_number
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        filter.insert("trdBuyNumberAnno".to_string(), json!(number));
    }
    if with_dates {
        if let Some(from) = query.publish_date.from {
            filter.insert("publishDateFrom".to_string(), json!(from.to_string()));
        }
        if let Some(to) = query.publish_date.to {
            filter.insert("publishDateTo".to_string(), json!(to.to_string()));
        }
        if let Some(from) = query.end_date.from {
            filter.insert("endDateFrom".to_string(), json!(from.to_string()));
        }
        if let Some(to) = query.end_date.to {
            filter.insert("endDateTo".to_string(), json!(to.to_string()));
        }
    }
    Value::Object(filter)
}

/// Build the GraphQL filter variable for an exact lot-number lookup. Distinct
/// from `announcement_number`/`trdBuyNumberAnno`: `lotNumber` addresses a lot
/// directly rather than the announcement it belongs to.
#[must_use]
pub fn build_gql_lot_number_filter(lot_number: &str) -> Value {
    json!({ "lotNumber": lot_number })
}

/// Build the REST v3 query-string parameters. List-valued fields are
/// comma-joined per §6.
#[must_use]
pub fn build_rest_params(query: &SearchQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        params.push(("nameDescriptionRu".to_string(), keyword.to_string()));
    }
    if let Some(bin) = query.customer_bin.as_deref().filter(|s| !s.is_empty()) {
        params.push(("customerBin".to_string(), bin.to_string()));
    }
    if let Some(name) = query.customer_name.as_deref().filter(|s| !s.is_empty()) {
        params.push(("customerNameRu".to_string(), name.to_string()));
    }
    if !query.status_ids.is_empty() {
        let joined = query
            .status_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.push(("refLotStatusId".to_string(), joined));
    }
    if !query.trade_method_ids.is_empty() {
        let joined = query
            .trade_method_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.push(("refTradeMethodsId".to_string(), joined));
    }
    if let Some(range) = &query.amount_range {
        params.push(("amountFrom".to_string(), range.min.to_string()));
        params.push(("amountTo".to_string(), range.max.to_string()));
    }
    if !query.region_codes.is_empty() {
        params.push(("regionCodes".to_string(), query.region_codes.join(",")));
    }
    params.push(("limit".to_string(), query.limit.to_string()));
    params.push(("offset".to_string(), query.offset.to_string()));
    params
}
