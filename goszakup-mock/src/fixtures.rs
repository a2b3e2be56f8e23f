//! Static, deterministic lot data keyed by keyword, grounded in the same
//! by-keyword lookup style as the rest of the mock data set.

use rust_decimal::Decimal;

use goszakup_types::{LotResult, SearchQuery, Source};

fn lot(
    lot_number: &str,
    lot_name: &str,
    description: &str,
    customer_bin: &str,
    amount: i64,
    source: Source,
) -> LotResult {
    LotResult {
        lot_number: lot_number.to_string(),
        announcement_number: format!("A-{lot_number}"),
        lot_name: lot_name.to_string(),
        description: description.to_string(),
        customer_name: "ТОО Образец".to_string(),
        customer_bin: customer_bin.to_string(),
        amount: Decimal::from(amount),
        currency: "KZT".to_string(),
        quantity: Decimal::ONE,
        trade_method: "Запрос ценовых предложений".to_string(),
        status: "Опубликован".to_string(),
        end_date: "2026-08-01T00:00:00Z".to_string(),
        url: format!("https://goszakup.gov.kz/ru/announce/index/{lot_number}"),
        source,
    }
}

/// Canned lots, keyed by the substring of `lot_name`/`description` that
/// retrieves them. Mirrors a handful of fixed scenarios rather than a full
/// dataset: enough for deterministic end-to-end tests.
fn by_keyword(keyword: &str, source: Source) -> Vec<LotResult> {
    let needle = keyword.to_lowercase();
    if needle.contains("лаки") {
        return vec![lot(
            "L-1",
            "Краски и лаки",
            "Поставка лакокрасочных материалов",
            "123456789012",
            100_000,
            source,
        )];
    }
    if needle.contains("бумага") {
        return vec![lot(
            "L-2",
            "Бумага офисная А4",
            "Поставка бумаги для офисной техники",
            "987654321098",
            50_000,
            source,
        )];
    }
    Vec::new()
}

/// Answer a search query from the fixed dataset, matching only on keyword.
/// Other filters are ignored since fixtures exist for specific scenarios,
/// not general-purpose filtering.
#[must_use]
pub fn search(query: &SearchQuery, source: Source) -> Vec<LotResult> {
    match query.keyword.as_deref() {
        Some(keyword) if !keyword.is_empty() => by_keyword(keyword, source),
        _ => Vec::new(),
    }
}

/// Look a lot up by its upstream-assigned number across the fixed dataset.
#[must_use]
pub fn by_lot_number(lot_number: &str, source: Source) -> Option<LotResult> {
    for keyword in ["лаки", "бумага"] {
        if let Some(found) = by_keyword(keyword, source)
            .into_iter()
            .find(|l| l.lot_number == lot_number)
        {
            return Some(found);
        }
    }
    None
}
