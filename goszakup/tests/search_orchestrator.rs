//! End-to-end scenarios for the search orchestrator over mock upstream clients.

use std::sync::Arc;
use std::time::Duration;

use goszakup::{SearchCache, SearchOrchestrator, UpstreamClient};
use goszakup_mock::dynamic::{DynamicMockClient, MockBehavior};
use goszakup_mock::MockClient;
use goszakup_types::{CacheConfig, LotResult, SearchQuery, Source};
use rust_decimal::Decimal;

fn lot(number: &str, name: &str, amount: i64, source: Source) -> LotResult {
    LotResult {
        lot_number: number.to_string(),
        announcement_number: String::new(),
        lot_name: name.to_string(),
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
        source,
    }
}

fn orchestrator(clients: Vec<Arc<dyn UpstreamClient>>) -> SearchOrchestrator {
    SearchOrchestrator::new(
        clients,
        SearchCache::new(&CacheConfig::default()),
        None,
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn repeat_search_is_served_from_cache() {
    let (client, controller) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
    controller
        .set_search_behavior("цемент", MockBehavior::Return(vec![lot("L-1", "цемент М500", 100, Source::GqlV2)]))
        .await;

    let orch = orchestrator(vec![client]);
    let mut query = SearchQuery {
        keyword: Some("цемент".to_string()),
        ..Default::default()
    };
    query.normalize();

    let first = orch.search(&query, Some(1), None).await.unwrap();
    assert_eq!(first.results.len(), 1);
    assert_eq!(first.diagnostics.strategy, Some(goszakup_types::SearchStrategy::GqlV2Only));

    // The mock records one request for the first call; a cache hit must not
    // issue a second upstream call.
    let second = orch.search(&query, Some(1), None).await.unwrap();
    assert_eq!(second.diagnostics.strategy, Some(goszakup_types::SearchStrategy::Cache));
    assert_eq!(controller.search_requests().await.len(), 1);
}

#[tokio::test]
async fn morphology_expansion_finds_results_on_an_inflected_form() {
    let (client, controller) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    controller
        .set_search_behavior("цемента", MockBehavior::Return(vec![lot("L-2", "поставка цемента", 50, Source::RestV3)]))
        .await;
    controller.set_default_search_behavior(MockBehavior::Return(vec![])).await;

    let orch = orchestrator(vec![client]);
    let mut query = SearchQuery {
        keyword: Some("цемент".to_string()),
        ..Default::default()
    };
    query.normalize();

    let report = orch.search(&query, Some(2), None).await.unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].lot_number, "L-2");
}

#[tokio::test]
async fn hybrid_strategy_merges_and_dedupes_across_clients() {
    let gql = Arc::new(MockClient::new("gql_v2", Source::GqlV2));
    let (rest, rest_controller) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    rest_controller
        .set_default_search_behavior(MockBehavior::Return(vec![lot("L-3", "лаки для дерева", 10, Source::RestV3)]))
        .await;

    let orch = orchestrator(vec![gql, rest]);
    let mut query = SearchQuery {
        keyword: Some("лаки".to_string()),
        ..Default::default()
    };
    query.normalize();

    let report = orch
        .search(&query, Some(3), Some(goszakup_types::SearchStrategy::Hybrid))
        .await
        .unwrap();
    assert_eq!(report.diagnostics.strategy, Some(goszakup_types::SearchStrategy::Hybrid));
    // MockClient's own fixtures plus the dynamic rest fixture both contribute;
    // a lot number collision would dedupe to one, distinct numbers stay separate.
    assert!(report.results.iter().any(|l| l.lot_number == "L-3"));
}

#[tokio::test]
async fn partial_failure_still_returns_the_surviving_clients_results() {
    let (failing, failing_ctl) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
    failing_ctl
        .set_default_search_behavior(MockBehavior::Fail(goszakup_types::GoszakupError::network("down")))
        .await;
    let (healthy, healthy_ctl) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    healthy_ctl
        .set_default_search_behavior(MockBehavior::Return(vec![lot("L-4", "бумага", 20, Source::RestV3)]))
        .await;

    let orch = orchestrator(vec![failing, healthy]);
    let mut query = SearchQuery {
        keyword: Some("бумага".to_string()),
        ..Default::default()
    };
    query.normalize();

    let report = orch
        .search(&query, Some(4), Some(goszakup_types::SearchStrategy::Hybrid))
        .await
        .unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.diagnostics.errors.len(), 1);
}

#[tokio::test]
async fn total_failure_collapses_to_the_worst_ranked_error() {
    let (a, a_ctl) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
    a_ctl
        .set_default_search_behavior(MockBehavior::Fail(goszakup_types::GoszakupError::network("down")))
        .await;
    let (b, b_ctl) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    b_ctl
        .set_default_search_behavior(MockBehavior::Fail(goszakup_types::GoszakupError::Unauthorized(
            "bad token".to_string(),
        )))
        .await;

    let orch = orchestrator(vec![a, b]);
    let mut query = SearchQuery {
        keyword: Some("цемент".to_string()),
        ..Default::default()
    };
    query.normalize();

    let err = orch
        .search(&query, Some(5), Some(goszakup_types::SearchStrategy::Hybrid))
        .await
        .unwrap_err();
    assert!(matches!(err, goszakup_types::GoszakupError::Unauthorized(_)));
}

#[tokio::test]
async fn lookup_by_number_falls_through_clients_that_do_not_have_it() {
    let (first, first_ctl) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
    first_ctl.set_lot_behavior("L-9", MockBehavior::Return(None)).await;
    let (second, second_ctl) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    second_ctl
        .set_lot_behavior("L-9", MockBehavior::Return(Some(lot("L-9", "труба", 5, Source::RestV3))))
        .await;

    let orch = orchestrator(vec![first, second]);
    let found = orch.get_lot_by_number("L-9").await.unwrap();
    assert_eq!(found.unwrap().lot_number, "L-9");
}
