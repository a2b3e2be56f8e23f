use std::sync::Arc;

use goszakup_core::UpstreamClient;
use goszakup_clients::GqlV2Client;
use goszakup_types::{BackoffConfig, GoszakupMappings, SearchQuery, Source};
use httpmock::MockServer;
use serde_json::json;

#[tokio::test]
async fn search_by_filters_maps_nested_gql_shape() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/v2/graphql");
        then.status(200).json_body(json!({
            "data": {
                "lots": [{
                    "lotNumber": "L-1",
                    "nameDescriptionRu": "Краски и лаки",
                    "descriptionRu": "Поставка лакокрасочных материалов",
                    "customerBin": "123456789012",
                    "customerNameRu": "ТОО Образец",
                    "amount": "100000",
                    "count": "1",
                    "endDate": "2026-08-01T00:00:00Z",
                    "TrdBuy": { "numberAnno": "A-1" },
                    "RefLotsStatus": { "nameRu": "Опубликован" },
                    "RefTradeMethods": { "nameRu": "Запрос ценовых предложений" }
                }]
            }
        }));
    });

    let http = reqwest::Client::new();
    let client = GqlV2Client::new(
        http,
        server.base_url(),
        "test-token".to_string(),
        BackoffConfig::default(),
        Arc::new(GoszakupMappings::bundled()),
    );

    let mut query = SearchQuery {
        keyword: Some("лак".to_string()),
        ..Default::default()
    };
    query.normalize();

    let results = client.search_by_filters(&query).await.expect("ok");
    mock.assert();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lot_number, "L-1");
    assert_eq!(results[0].announcement_number, "A-1");
    assert_eq!(results[0].source, Source::GqlV2);
}

#[tokio::test]
async fn graphql_errors_field_maps_to_protocol_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/v2/graphql");
        then.status(200)
            .json_body(json!({ "errors": [{ "message": "bad filter" }] }));
    });

    let http = reqwest::Client::new();
    let client = GqlV2Client::new(
        http,
        server.base_url(),
        "test-token".to_string(),
        BackoffConfig::default(),
        Arc::new(GoszakupMappings::bundled()),
    );

    let mut query = SearchQuery::default();
    query.normalize();
    let err = client.search_by_filters(&query).await.expect_err("err");
    assert!(matches!(err, goszakup_types::GoszakupError::Protocol(_)));
}
