//! Classifies a query's complexity and produces an ordered, health-aware
//! candidate list of clients to try, per the priority table below.
//!
//! | Complexity | Preferred order |
//! |---|---|
//! | Simple (≤1 filter) | REST v3, then GQL v3, then GQL v2 |
//! | Moderate (2-3 filters) | GQL v2 (if healthy), then REST v3 |
//! | Complex (≥4 filters) | GQL v2 (required), then GQL v3 |
//!
//! Plus an explicit `Hybrid` mode fanning out to GQL v2 + REST v3
//! concurrently.

use std::sync::Arc;

use goszakup_core::UpstreamClient;
use goszakup_types::{SearchComplexity, SearchQuery, SearchStrategy};

/// An ordered list of candidates and whether they should be raced
/// concurrently (`Hybrid`) or tried one at a time with fallback (the rest).
pub enum Plan {
    /// Try candidates in order; advance to the next on recoverable failure.
    Sequential(Vec<Arc<dyn UpstreamClient>>),
    /// Launch every candidate concurrently and merge whatever completes.
    Hybrid(Vec<Arc<dyn UpstreamClient>>),
}

impl Plan {
    /// The candidate list regardless of execution mode.
    #[must_use]
    pub fn candidates(&self) -> &[Arc<dyn UpstreamClient>] {
        match self {
            Self::Sequential(v) | Self::Hybrid(v) => v,
        }
    }
}

fn by_name(clients: &[Arc<dyn UpstreamClient>], name: &str) -> Option<Arc<dyn UpstreamClient>> {
    clients.iter().find(|c| c.name() == name).cloned()
}

/// Filter `order` down to the configured, currently-healthy clients,
/// preserving priority order. An unhealthy or unconfigured candidate is
/// simply skipped, promoting the next one — never an error by itself.
fn healthy_ordered(clients: &[Arc<dyn UpstreamClient>], order: &[&str]) -> Vec<Arc<dyn UpstreamClient>> {
    order
        .iter()
        .filter_map(|name| by_name(clients, name))
        .filter(|c| c.is_healthy())
        .collect()
}

/// Classify `query` and build its candidate plan from the currently
/// registered `clients`.
#[must_use]
pub fn select(query: &SearchQuery, clients: &[Arc<dyn UpstreamClient>]) -> Plan {
    match query.complexity() {
        SearchComplexity::Simple => {
            Plan::Sequential(healthy_ordered(clients, &["rest_v3", "gql_v3", "gql_v2"]))
        }
        SearchComplexity::Moderate => {
            Plan::Sequential(healthy_ordered(clients, &["gql_v2", "rest_v3"]))
        }
        SearchComplexity::Complex => {
            Plan::Sequential(healthy_ordered(clients, &["gql_v2", "gql_v3"]))
        }
    }
}

/// Build the `Hybrid` plan: GQL v2 + REST v3 concurrently, plus the
/// webhook relay if configured (it has no slot in the priority table above
/// since it is an optional supplementary source, not a ranked fallback; it
/// rides along on hybrid fan-outs instead, and its results still pass
/// dedup/relevance like everyone else's).
#[must_use]
pub fn select_hybrid(clients: &[Arc<dyn UpstreamClient>]) -> Plan {
    Plan::Hybrid(healthy_ordered(clients, &["gql_v2", "rest_v3", "webhook"]))
}

/// Build the single-client plan for an explicit strategy override.
#[must_use]
pub fn select_forced(strategy: SearchStrategy, clients: &[Arc<dyn UpstreamClient>]) -> Plan {
    match strategy {
        SearchStrategy::GqlV2Only => Plan::Sequential(healthy_ordered(clients, &["gql_v2"])),
        SearchStrategy::GqlV3Only => Plan::Sequential(healthy_ordered(clients, &["gql_v3"])),
        SearchStrategy::RestV3Only => Plan::Sequential(healthy_ordered(clients, &["rest_v3"])),
        SearchStrategy::Hybrid => select_hybrid(clients),
        SearchStrategy::Auto | SearchStrategy::Cache => {
            unreachable!("select_forced is only called with a concrete non-auto strategy")
        }
    }
}

/// Map a client's [`goszakup_types::Source`] to the reporting tag used when
/// a single-client (non-hybrid) search succeeds.
#[must_use]
pub fn strategy_for_source(source: goszakup_types::Source) -> SearchStrategy {
    match source {
        goszakup_types::Source::GqlV2 => SearchStrategy::GqlV2Only,
        goszakup_types::Source::GqlV3 => SearchStrategy::GqlV3Only,
        goszakup_types::Source::RestV3 => SearchStrategy::RestV3Only,
        // The webhook relay never appears in a sequential plan; if it ever
        // did, tag it like the hybrid mode it rides along with.
        goszakup_types::Source::Webhook => SearchStrategy::Hybrid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goszakup_mock::MockClient;
    use goszakup_types::Source;

    fn client(name: &'static str, source: Source) -> Arc<dyn UpstreamClient> {
        Arc::new(MockClient::new(name, source))
    }

    #[test]
    fn simple_query_prefers_rest_v3_first() {
        let clients = vec![
            client("gql_v2", Source::GqlV2),
            client("rest_v3", Source::RestV3),
        ];
        let query = SearchQuery::default();
        let plan = select(&query, &clients);
        assert_eq!(plan.candidates()[0].name(), "rest_v3");
    }

    #[test]
    fn complex_query_prefers_gql_v2_first() {
        let clients = vec![
            client("gql_v2", Source::GqlV2),
            client("rest_v3", Source::RestV3),
        ];
        let mut query = SearchQuery {
            customer_bin: Some("123456789012".to_string()),
            customer_name: Some("x".to_string()),
            trade_method_ids: vec![1],
            status_ids: vec![2],
            ..Default::default()
        };
        query.normalize();
        assert_eq!(query.filter_count(), 4);
        let plan = select(&query, &clients);
        assert_eq!(plan.candidates()[0].name(), "gql_v2");
    }

    #[test]
    fn unhealthy_first_candidate_is_skipped() {
        let (unhealthy, controller) =
            goszakup_mock::dynamic::DynamicMockClient::new_with_controller("rest_v3", Source::RestV3);
        controller.set_healthy(false);
        let clients = vec![unhealthy, client("gql_v3", Source::GqlV3)];
        let plan = select(&SearchQuery::default(), &clients);
        assert_eq!(plan.candidates()[0].name(), "gql_v3");
    }

    #[test]
    fn hybrid_plan_includes_webhook_when_configured() {
        let clients = vec![
            client("gql_v2", Source::GqlV2),
            client("rest_v3", Source::RestV3),
            client("webhook", Source::Webhook),
        ];
        let plan = select_hybrid(&clients);
        assert!(matches!(plan, Plan::Hybrid(_)));
        assert_eq!(plan.candidates().len(), 3);
    }
}
