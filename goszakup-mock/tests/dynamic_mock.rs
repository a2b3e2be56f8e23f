use goszakup_core::UpstreamClient;
use goszakup_mock::{DynamicMockClient, MockBehavior};
use goszakup_types::{GoszakupError, LotResult, SearchQuery, Source};
use rust_decimal::Decimal;

fn lot(lot_number: &str, amount: i64) -> LotResult {
    LotResult {
        lot_number: lot_number.to_string(),
        announcement_number: String::new(),
        lot_name: "test lot".to_string(),
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

fn query(keyword: &str) -> SearchQuery {
    SearchQuery {
        keyword: Some(keyword.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_mock_search_return() {
    let (client, controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    controller
        .set_search_behavior("лаки", MockBehavior::Return(vec![lot("L-1", 100_000)]))
        .await;

    let got = client.search_by_filters(&query("лаки")).await.expect("ok");
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].lot_number, "L-1");
}

#[tokio::test]
async fn test_mock_search_fail() {
    let (client, controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    let err = GoszakupError::network("boom");
    controller
        .set_search_behavior("бумага", MockBehavior::Fail(err.clone()))
        .await;

    let got = client
        .search_by_filters(&query("бумага"))
        .await
        .expect_err("err");
    assert_eq!(got, err);
}

#[tokio::test]
async fn test_mock_search_unknown_keyword_returns_empty() {
    let (client, _controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    let got = client
        .search_by_filters(&query("неизвестно"))
        .await
        .expect("ok");
    assert!(got.is_empty());
}

#[tokio::test]
async fn test_mock_logs_search_requests() {
    let (client, controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    let _ = client.search_by_filters(&query("лаки")).await;
    let _ = client.search_by_filters(&query("бумага")).await;

    let reqs = controller.search_requests().await;
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].keyword.as_deref(), Some("лаки"));
}

#[tokio::test]
async fn test_mock_health_flag_is_driven_by_controller() {
    let (client, controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    assert!(client.is_healthy());
    controller.set_healthy(false);
    assert!(!client.is_healthy());
}

#[tokio::test]
async fn test_mock_lot_lookup() {
    let (client, controller) = DynamicMockClient::new_with_controller("P0", Source::GqlV2);
    controller
        .set_lot_behavior("L-1", MockBehavior::Return(Some(lot("L-1", 100_000))))
        .await;

    let got = client.get_lot_by_number("L-1").await.expect("ok");
    assert_eq!(got.unwrap().lot_number, "L-1");

    let missing = client.get_lot_by_number("L-2").await.expect("ok");
    assert!(missing.is_none());
}
