use goszakup_core::dedup_lots;
use goszakup_types::{LotResult, Source};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_lot_number() -> impl Strategy<Value = String> {
    "[A-Z]-[0-9]{1,3}"
}

fn arb_lot(number: String, amount: i64) -> LotResult {
    LotResult {
        lot_number: number,
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

proptest! {
    #[test]
    fn dedup_never_yields_duplicate_identities(
        numbers in prop::collection::vec(arb_lot_number(), 0..30),
        amount in 0i64..1_000_000,
    ) {
        let lots: Vec<LotResult> = numbers.into_iter().map(|n| arb_lot(n, amount)).collect();
        let deduped = dedup_lots(lots);
        let mut seen = std::collections::HashSet::new();
        for lot in &deduped {
            prop_assert!(seen.insert(lot.identity()));
        }
    }

    #[test]
    fn dedup_never_grows_the_input(
        numbers in prop::collection::vec(arb_lot_number(), 0..30),
        amount in 0i64..1_000_000,
    ) {
        let lots: Vec<LotResult> = numbers.into_iter().map(|n| arb_lot(n, amount)).collect();
        let original_len = lots.len();
        let deduped = dedup_lots(lots);
        prop_assert!(deduped.len() <= original_len);
    }
}
