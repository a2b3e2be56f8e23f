//! Static reference tables for trade methods and lot statuses.
//!
//! Bundled with the binary so a fresh install works without a network call, but
//! reloadable from a JSON file at startup so the portal's reference data can be
//! refreshed without a rebuild.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single reference-table row: a numeric upstream id mapped to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefMapping {
    /// Upstream numeric id.
    pub id: u32,
    /// Russian display name.
    pub name_ru: String,
    /// Kazakh display name.
    pub name_kz: String,
    /// Short stable code, e.g. `"OT"`.
    pub code: String,
    /// Longer description, may be empty.
    pub description: String,
}

/// Lookup table for trade methods and lot statuses, resolved by numeric id.
///
/// When an id has no entry, callers fall back to the stringified id so no
/// information is silently dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoszakupMappings {
    /// Trade method id -> mapping.
    pub trade_methods: HashMap<u32, RefMapping>,
    /// Lot status id -> mapping.
    pub lot_statuses: HashMap<u32, RefMapping>,
}

impl GoszakupMappings {
    /// Build the table with the baseline entries known at the time of writing,
    /// so the binary has working reference data even if no JSON override is
    /// supplied.
    #[must_use]
    pub fn bundled() -> Self {
        let mut trade_methods = HashMap::new();
        trade_methods.insert(
            1,
            RefMapping {
                id: 1,
                name_ru: "Открытый тендер".to_string(),
                name_kz: "Ашық тендер".to_string(),
                code: "OT".to_string(),
                description: String::new(),
            },
        );
        trade_methods.insert(
            2,
            RefMapping {
                id: 2,
                name_ru: "Запрос ценовых предложений".to_string(),
                name_kz: "Баға ұсыныстарын сұрату".to_string(),
                code: "RFQ".to_string(),
                description: String::new(),
            },
        );
        trade_methods.insert(
            3,
            RefMapping {
                id: 3,
                name_ru: "Из одного источника".to_string(),
                name_kz: "Бір көзден алу".to_string(),
                code: "OS".to_string(),
                description: String::new(),
            },
        );

        let mut lot_statuses = HashMap::new();
        lot_statuses.insert(
            1,
            RefMapping {
                id: 1,
                name_ru: "Опубликовано".to_string(),
                name_kz: "Жарияланды".to_string(),
                code: "PUBLISHED".to_string(),
                description: String::new(),
            },
        );
        lot_statuses.insert(
            2,
            RefMapping {
                id: 2,
                name_ru: "Прием заявок завершен".to_string(),
                name_kz: "Өтінімдер қабылдау аяқталды".to_string(),
                code: "CLOSED".to_string(),
                description: String::new(),
            },
        );
        lot_statuses.insert(
            3,
            RefMapping {
                id: 3,
                name_ru: "Итоги подведены".to_string(),
                name_kz: "Қорытынды шығарылды".to_string(),
                code: "AWARDED".to_string(),
                description: String::new(),
            },
        );

        Self {
            trade_methods,
            lot_statuses,
        }
    }

    /// Load a table from a JSON file, falling back to [`Self::bundled`] entries
    /// for ids the file does not override.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not contain valid JSON
    /// matching this struct's shape.
    pub fn load_from_json(contents: &str) -> serde_json::Result<Self> {
        let overrides: Self = serde_json::from_str(contents)?;
        let mut base = Self::bundled();
        base.trade_methods.extend(overrides.trade_methods);
        base.lot_statuses.extend(overrides.lot_statuses);
        Ok(base)
    }

    /// Resolve a trade method id, falling back to the stringified id.
    #[must_use]
    pub fn trade_method_name(&self, id: u32) -> String {
        self.trade_methods
            .get(&id)
            .map_or_else(|| id.to_string(), |m| m.name_ru.clone())
    }

    /// Resolve a lot status id, falling back to the stringified id.
    #[must_use]
    pub fn lot_status_name(&self, id: u32) -> String {
        self.lot_statuses
            .get(&id)
            .map_or_else(|| id.to_string(), |m| m.name_ru.clone())
    }
}
