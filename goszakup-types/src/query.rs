//! Search query shape and the complexity classification it drives.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An inclusive amount range, `0 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    /// Inclusive lower bound.
    pub min: Decimal,
    /// Inclusive upper bound.
    pub max: Decimal,
}

/// An inclusive date range over `from..=to`; either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// True if neither bound is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Filters and paging for a procurement lot search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text keyword, 0-200 chars.
    pub keyword: Option<String>,
    /// Customer's 12-digit BIN.
    pub customer_bin: Option<String>,
    /// Customer display name (partial match upstream-side).
    pub customer_name: Option<String>,
    /// Set of trade method ids to filter on.
    pub trade_method_ids: Vec<u32>,
    /// Set of lot status ids to filter on.
    pub status_ids: Vec<u32>,
    /// Inclusive amount range.
    pub amount_range: Option<AmountRange>,
    /// Announcement (trade) number.
    pub announcement_number: Option<String>,
    /// Publish-date window.
    pub publish_date: DateRange,
    /// End-date window.
    pub end_date: DateRange,
    /// Region codes to filter on.
    pub region_codes: Vec<String>,
    /// Max results to return, clamped to `[1, 100]`.
    pub limit: u32,
    /// Offset into the result set.
    pub offset: u32,
}

impl SearchQuery {
    /// Clamp `limit`/`offset` into their contractual ranges, defaulting `limit`
    /// to 10 when zero.
    pub fn normalize(&mut self) {
        if self.limit == 0 {
            self.limit = 10;
        }
        self.limit = self.limit.clamp(1, 100);
    }

    /// Count of active top-level filters, excluding `limit`/`offset`. Each of
    /// the ten filter groups below contributes at most one to the count.
    #[must_use]
    pub fn filter_count(&self) -> u32 {
        let mut n = 0;
        if self.keyword.as_deref().is_some_and(|s| !s.is_empty()) {
            n += 1;
        }
        if self.customer_bin.as_deref().is_some_and(|s| !s.is_empty()) {
            n += 1;
        }
        if self
            .customer_name
            .as_deref()
            .is_some_and(|s| !s.is_empty())
        {
            n += 1;
        }
        if !self.trade_method_ids.is_empty() {
            n += 1;
        }
        if !self.status_ids.is_empty() {
            n += 1;
        }
        if self.amount_range.is_some() {
            n += 1;
        }
        if self
            .announcement_number
            .as_deref()
            .is_some_and(|s| !s.is_empty())
        {
            n += 1;
        }
        if !self.publish_date.is_empty() {
            n += 1;
        }
        if !self.end_date.is_empty() {
            n += 1;
        }
        if !self.region_codes.is_empty() {
            n += 1;
        }
        n
    }

    /// Classify this query's complexity from its active filter count.
    #[must_use]
    pub fn complexity(&self) -> SearchComplexity {
        match self.filter_count() {
            0 | 1 => SearchComplexity::Simple,
            2 | 3 => SearchComplexity::Moderate,
            _ => SearchComplexity::Complex,
        }
    }

    /// True if the query has neither a keyword nor any other filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyword.as_deref().is_none_or(str::is_empty) && self.filter_count() == 0
    }
}

/// Complexity classification driving strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchComplexity {
    /// 0-1 active filters.
    Simple,
    /// 2-3 active filters.
    Moderate,
    /// 4+ active filters.
    Complex,
}

/// Strategy used (or forced) for a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Let the selector classify the query and pick.
    Auto,
    /// GraphQL v2 only.
    GqlV2Only,
    /// GraphQL v3 only.
    GqlV3Only,
    /// REST v3 only.
    RestV3Only,
    /// Fan out to GQL v2 + REST v3 concurrently and merge.
    Hybrid,
    /// Served entirely from cache; never chosen by the selector, only reported.
    Cache,
}

impl SearchStrategy {
    /// Stable tag used in diagnostics and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::GqlV2Only => "gql_v2",
            Self::GqlV3Only => "gql_v3",
            Self::RestV3Only => "rest_v3",
            Self::Hybrid => "hybrid",
            Self::Cache => "cache",
        }
    }
}

impl core::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
