//! Wire shapes returned by the upstream APIs and their mapping onto
//! [`LotResult`]. `trade_method`/`status` fall back to the bundled reference
//! table when a response carries only the numeric id and no embedded name.

use rust_decimal::Decimal;
use serde::Deserialize;

use goszakup_types::{GoszakupMappings, LotResult, Source};

fn default_currency() -> String {
    "KZT".to_string()
}

fn one() -> Decimal {
    Decimal::ONE
}

fn lot_url(lot_number: &str) -> String {
    if lot_number.is_empty() {
        String::new()
    } else {
        format!("https://goszakup.gov.kz/ru/announce/index/{lot_number}")
    }
}

/// A single lot as returned by the GQL v2/v3 endpoints: the nested
/// `TrdBuy`/`RefLotsStatus`/`RefTradeMethods` structures described in the
/// upstream schema.
#[derive(Debug, Deserialize)]
pub struct GqlLot {
    #[serde(default)]
    pub lot_number: String,
    #[serde(rename = "nameDescriptionRu", default)]
    pub name_description_ru: String,
    #[serde(rename = "descriptionRu", default)]
    pub description_ru: String,
    #[serde(rename = "customerBin", default)]
    pub customer_bin: String,
    #[serde(rename = "customerNameRu", default)]
    pub customer_name_ru: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default = "one")]
    pub count: Decimal,
    #[serde(rename = "TrdBuy", default)]
    pub trd_buy: Option<GqlTrdBuy>,
    #[serde(rename = "RefLotsStatus", default)]
    pub ref_lots_status: Option<GqlRefName>,
    #[serde(rename = "RefTradeMethods", default)]
    pub ref_trade_methods: Option<GqlRefName>,
    #[serde(rename = "refLotStatusId", default)]
    pub ref_lot_status_id: Option<u32>,
    #[serde(rename = "refTradeMethodsId", default)]
    pub ref_trade_methods_id: Option<u32>,
    #[serde(rename = "endDate", default)]
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlTrdBuy {
    #[serde(rename = "numberAnno", default)]
    pub number_anno: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlRefName {
    #[serde(rename = "nameRu", default)]
    pub name_ru: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlLotsData {
    #[serde(default)]
    pub lots: Vec<GqlLot>,
}

#[derive(Debug, Deserialize)]
pub struct GqlErrorEntry {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlEnvelope {
    pub data: Option<GqlLotsData>,
    pub errors: Option<Vec<GqlErrorEntry>>,
}

impl GqlLot {
    #[must_use]
    pub fn into_result(self, source: Source, mappings: &GoszakupMappings) -> LotResult {
        let announcement_number = self
            .trd_buy
            .map(|t| t.number_anno)
            .unwrap_or_default();
        let trade_method = self
            .ref_trade_methods
            .and_then(|r| (!r.name_ru.is_empty()).then_some(r.name_ru))
            .or_else(|| self.ref_trade_methods_id.map(|id| mappings.trade_method_name(id)))
            .unwrap_or_default();
        let status = self
            .ref_lots_status
            .and_then(|r| (!r.name_ru.is_empty()).then_some(r.name_ru))
            .or_else(|| self.ref_lot_status_id.map(|id| mappings.lot_status_name(id)))
            .unwrap_or_default();
        LotResult {
            url: lot_url(&self.lot_number),
            lot_number: self.lot_number,
            announcement_number,
            lot_name: self.name_description_ru,
            description: self.description_ru,
            customer_name: self.customer_name_ru,
            customer_bin: self.customer_bin,
            amount: self.amount,
            currency: default_currency(),
            quantity: self.count,
            trade_method,
            status,
            end_date: self.end_date,
            source,
        }
    }
}

/// A single lot as returned by the REST v3 endpoint, tolerant of both
/// `snake_case` and `camelCase` field names.
#[derive(Debug, Deserialize)]
pub struct RestLot {
    #[serde(alias = "lotNumber", default)]
    pub lot_number: String,
    #[serde(alias = "announcementNumber", default)]
    pub announcement_number: String,
    #[serde(alias = "lotName", alias = "nameDescriptionRu", default)]
    pub lot_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "customerName", default)]
    pub customer_name: String,
    #[serde(alias = "customerBin", default)]
    pub customer_bin: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "one")]
    pub quantity: Decimal,
    #[serde(alias = "tradeMethod", default)]
    pub trade_method: String,
    #[serde(default)]
    pub status: String,
    #[serde(alias = "refTradeMethodsId", alias = "ref_trade_methods_id", default)]
    pub ref_trade_methods_id: Option<u32>,
    #[serde(alias = "refLotStatusId", alias = "ref_lot_status_id", default)]
    pub ref_lot_status_id: Option<u32>,
    #[serde(alias = "endDate", default)]
    pub end_date: String,
    #[serde(default)]
    pub url: String,
}

impl RestLot {
    #[must_use]
    pub fn into_result(self, source: Source, mappings: &GoszakupMappings) -> LotResult {
        let url = if self.url.is_empty() {
            lot_url(&self.lot_number)
        } else {
            self.url
        };
        let trade_method = if self.trade_method.is_empty() {
            self.ref_trade_methods_id
                .map(|id| mappings.trade_method_name(id))
                .unwrap_or_default()
        } else {
            self.trade_method
        };
        let status = if self.status.is_empty() {
            self.ref_lot_status_id
                .map(|id| mappings.lot_status_name(id))
                .unwrap_or_default()
        } else {
            self.status
        };
        LotResult {
            lot_number: self.lot_number,
            announcement_number: self.announcement_number,
            lot_name: self.lot_name,
            description: self.description,
            customer_name: self.customer_name,
            customer_bin: self.customer_bin,
            amount: self.amount,
            currency: self.currency,
            quantity: self.quantity,
            trade_method,
            status,
            end_date: self.end_date,
            url,
            source,
        }
    }
}

/// Pull a lot array out of whichever envelope key the REST v3 endpoint used
/// (`lots`, `items`, `data`), or the bare root array.
#[must_use]
pub fn extract_rest_lots(body: &serde_json::Value) -> Vec<RestLot> {
    let array = body
        .get("lots")
        .or_else(|| body.get("items"))
        .or_else(|| body.get("data"))
        .unwrap_or(body);
    serde_json::from_value::<Vec<RestLot>>(array.clone()).unwrap_or_default()
}
