use std::sync::Arc;
use std::time::Duration;

use goszakup_core::UpstreamClient;
use goszakup_middleware::BlacklistClient;
use goszakup_mock::dynamic::{DynamicMockClient, MockBehavior};
use goszakup_types::{GoszakupError, SearchQuery, Source};

#[tokio::test]
async fn rate_limited_error_triggers_cooldown_then_blacklists_further_calls() {
    let (inner, controller) = DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
    controller
        .set_search_behavior(
            "cement",
            MockBehavior::Fail(GoszakupError::RateLimited {
                limit: 10,
                window_ms: 60_000,
            }),
        )
        .await;

    let wrapped = BlacklistClient::new(inner, Duration::from_secs(30));
    let mut query = SearchQuery {
        keyword: Some("cement".to_string()),
        ..Default::default()
    };
    query.normalize();

    let first = wrapped.search_by_filters(&query).await;
    assert!(matches!(first, Err(GoszakupError::RateLimited { .. })));

    let second = wrapped.search_by_filters(&query).await;
    assert!(matches!(
        second,
        Err(GoszakupError::TemporarilyBlacklisted { .. })
    ));
    assert!(!wrapped.is_healthy());
}

#[tokio::test]
async fn non_rate_limit_errors_do_not_blacklist() {
    let (inner, controller) = DynamicMockClient::new_with_controller("gql_v2", Source::GqlV2);
    controller
        .set_search_behavior("steel", MockBehavior::Fail(GoszakupError::network("boom")))
        .await;

    let wrapped = BlacklistClient::new(inner, Duration::from_secs(30));
    let mut query = SearchQuery {
        keyword: Some("steel".to_string()),
        ..Default::default()
    };
    query.normalize();

    let _ = wrapped.search_by_filters(&query).await;
    assert!(wrapped.is_healthy());
}
