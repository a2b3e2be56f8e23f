//! The canonical normalized procurement record produced by every upstream client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which upstream protocol produced a [`LotResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// GraphQL v2 endpoint.
    GqlV2,
    /// GraphQL v3 endpoint.
    GqlV3,
    /// REST v3 endpoint.
    RestV3,
    /// Optional webhook relay.
    Webhook,
}

impl Source {
    /// Stable tag used in diagnostics and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GqlV2 => "gql_v2",
            Self::GqlV3 => "gql_v3",
            Self::RestV3 => "rest_v3",
            Self::Webhook => "webhook",
        }
    }
}

impl core::fmt::Display for Source {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity key used for de-duplication across upstream clients.
///
/// `lot_number` is preferred when present; otherwise the `(customer_bin, lot_name,
/// amount)` triple stands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LotIdentity {
    /// Identified by a upstream-assigned lot number.
    Number(String),
    /// Identified by the fallback triple when no lot number is present.
    Fallback {
        /// Customer BIN.
        customer_bin: String,
        /// Lot name.
        lot_name: String,
        /// Amount, stringified for hashing (`Decimal` does not implement `Hash`
        /// consistently across scale-normalized values, so the display form is used).
        amount: String,
    },
}

/// A normalized procurement lot, regardless of which upstream API produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotResult {
    /// Upstream-assigned lot number, empty if the upstream did not provide one.
    pub lot_number: String,
    /// Announcement (trade) number this lot belongs to.
    pub announcement_number: String,
    /// Lot name/title.
    pub lot_name: String,
    /// Free-text description.
    pub description: String,
    /// Procuring customer's display name.
    pub customer_name: String,
    /// Customer's 12-digit BIN, empty if unknown.
    pub customer_bin: String,
    /// Lot amount, always non-negative.
    pub amount: Decimal,
    /// ISO-ish currency code, defaults to `"KZT"`.
    pub currency: String,
    /// Quantity of the procured item, non-negative.
    pub quantity: Decimal,
    /// Trade method, resolved through the reference table when possible.
    pub trade_method: String,
    /// Lot status, resolved through the reference table when possible.
    pub status: String,
    /// RFC3339 end date, empty if unknown.
    pub end_date: String,
    /// Canonical URL for the lot on the source portal, empty if unknown.
    pub url: String,
    /// Which upstream client produced this record.
    pub source: Source,
}

impl LotResult {
    /// Compute the de-duplication identity for this lot.
    #[must_use]
    pub fn identity(&self) -> LotIdentity {
        if self.lot_number.is_empty() {
            LotIdentity::Fallback {
                customer_bin: self.customer_bin.clone(),
                lot_name: self.lot_name.clone(),
                amount: self.amount.normalize().to_string(),
            }
        } else {
            LotIdentity::Number(self.lot_number.clone())
        }
    }

    /// Text blob searched by the morphology engine's relevance filter.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.lot_name, self.description)
    }
}
