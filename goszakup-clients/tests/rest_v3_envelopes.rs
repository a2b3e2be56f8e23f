use std::sync::Arc;

use goszakup_core::UpstreamClient;
use goszakup_clients::RestV3Client;
use goszakup_types::{BackoffConfig, GoszakupMappings, SearchQuery, Source};
use httpmock::MockServer;
use serde_json::json;

#[tokio::test]
async fn accepts_items_envelope_and_camel_case_fields() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/v3/lots");
        then.status(200).json_body(json!({
            "items": [{
                "lotNumber": "L-2",
                "lotName": "Бумага офисная А4",
                "amount": "50000",
                "customerBin": "987654321098"
            }]
        }));
    });

    let http = reqwest::Client::new();
    let client = RestV3Client::new(
        http,
        server.base_url(),
        "test-token".to_string(),
        BackoffConfig::default(),
        Arc::new(GoszakupMappings::bundled()),
    );

    let mut query = SearchQuery {
        keyword: Some("бумага".to_string()),
        ..Default::default()
    };
    query.normalize();

    let results = client.search_by_filters(&query).await.expect("ok");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lot_number, "L-2");
    assert_eq!(results[0].source, Source::RestV3);
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/v3/lots");
        then.status(401);
    });

    let http = reqwest::Client::new();
    let client = RestV3Client::new(
        http,
        server.base_url(),
        "test-token".to_string(),
        BackoffConfig::default(),
        Arc::new(GoszakupMappings::bundled()),
    );

    let mut query = SearchQuery::default();
    query.normalize();
    let err = client.search_by_filters(&query).await.expect_err("err");
    assert!(matches!(err, goszakup_types::GoszakupError::Unauthorized(_)));
}
