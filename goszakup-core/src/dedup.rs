//! Merge and de-duplication helpers shared by the search orchestrator.

use std::collections::HashSet;

use goszakup_types::{LotIdentity, LotResult};

/// De-duplicate a list of merged lot results using the identity rule from
/// [`LotResult::identity`]: first occurrence wins, later duplicates are dropped.
///
/// Groups by identity key and keeps the entry associated with the earliest
/// index, simplified to "first write wins" since there is no per-candidate
/// priority to break ties with beyond insertion order.
#[must_use]
pub fn dedup_lots(merged: Vec<LotResult>) -> Vec<LotResult> {
    let mut seen: HashSet<LotIdentity> = HashSet::with_capacity(merged.len());
    let mut out = Vec::with_capacity(merged.len());
    for lot in merged {
        if seen.insert(lot.identity()) {
            out.push(lot);
        }
    }
    out
}

/// Sort lots descending by amount, with ties broken by original insertion order
/// (a stable sort on the reversed amount achieves this directly).
pub fn sort_by_amount_desc(lots: &mut [LotResult]) {
    lots.sort_by(|a, b| b.amount.cmp(&a.amount));
}

#[cfg(test)]
mod tests {
    use super::*;
    use goszakup_types::Source;
    use rust_decimal::Decimal;

    fn lot(number: &str, amount: i64) -> LotResult {
        LotResult {
            lot_number: number.to_string(),
            announcement_number: String::new(),
            lot_name: "lot".to_string(),
            description: String::new(),
            customer_name: String::new(),
            customer_bin: String::new(),
            amount: Decimal::from(amount),
            currency: "KZT".to_string(),
            quantity: Decimal::ONE,
            trade_method: String::new(),
            status: String::new(),
            end_date: String::new(),
            url: String::new(),
            source: Source::GqlV2,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut first = lot("L-1", 100);
        first.source = Source::GqlV2;
        let mut dup = lot("L-1", 100);
        dup.source = Source::RestV3;
        let unique = lot("L-2", 50);

        let out = dedup_lots(vec![first, dup, unique]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source, Source::GqlV2);
    }

    #[test]
    fn sort_orders_by_amount_descending() {
        let mut lots = vec![lot("L-1", 10), lot("L-2", 100), lot("L-3", 50)];
        sort_by_amount_desc(&mut lots);
        assert_eq!(
            lots.iter().map(|l| l.lot_number.clone()).collect::<Vec<_>>(),
            vec!["L-2", "L-3", "L-1"]
        );
    }
}
