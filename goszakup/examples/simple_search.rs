//! Build an engine against mock upstream clients and run one search.
//!
//! `cargo run --example simple_search -p goszakup`

use std::sync::Arc;
use std::time::Duration;

use goszakup::{SearchCache, SearchOrchestrator, SearchQuery};
use goszakup_mock::MockClient;
use goszakup_types::Source;

#[tokio::main]
async fn main() -> Result<(), goszakup::GoszakupError> {
    let clients: Vec<Arc<dyn goszakup::UpstreamClient>> = vec![
        Arc::new(MockClient::new("gql_v2", Source::GqlV2)),
        Arc::new(MockClient::new("rest_v3", Source::RestV3)),
    ];

    let orchestrator = SearchOrchestrator::new(
        clients,
        SearchCache::new(&goszakup_types::CacheConfig::default()),
        None,
        Duration::from_secs(10),
        Duration::from_secs(10),
    );

    let mut query = SearchQuery {
        keyword: Some("цемент".to_string()),
        ..SearchQuery::default()
    };
    query.normalize();

    let report = orchestrator.search(&query, Some(1), None).await?;
    println!(
        "strategy={:?} results={}",
        report.diagnostics.strategy,
        report.results.len()
    );
    for lot in &report.results {
        println!("  {} — {} ({} {})", lot.lot_number, lot.lot_name, lot.amount, lot.currency);
    }
    Ok(())
}
