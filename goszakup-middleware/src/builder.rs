//! Builder for composing an upstream client with middleware layers.
//!
//! # Middleware Ordering Convention
//!
//! Middleware layers form an "onion" around the raw client:
//!
//! ```text
//! Orchestrator call
//!     ↓
//! Outermost: Cache (serves a hit without touching blacklist state)
//!     ↓
//! Blacklist (checks cool-down, observes rate-limit errors)
//!     ↓
//! Raw client (GQL v2 / GQL v3 / REST v3 / webhook)
//! ```
//!
//! The `layers` vector stores middleware in outermost-first order; `build()`
//! applies them in reverse to construct the nesting.

use std::sync::Arc;
use std::time::Duration;

use goszakup_core::UpstreamClient;
use goszakup_core::{
    GoszakupError, Middleware,
    middleware::{MiddlewareDescriptor, ValidationContext},
};
use goszakup_types::{CacheConfig, MiddlewareLayer, MiddlewareStack};

/// Generic middleware builder for composing a raw upstream client with
/// layered wrappers.
///
/// See [module-level documentation](self) for ordering details.
pub struct ClientBuilder {
    raw: Arc<dyn UpstreamClient>,
    /// Middleware layers in outermost-first order.
    layers: Vec<MiddlewareDescriptor>,
}

impl ClientBuilder {
    /// Create a new builder from a raw, unwrapped client.
    #[must_use]
    pub fn new(raw: Arc<dyn UpstreamClient>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Reorder layers to satisfy policy: Cache (outermost) -> Blacklist -> others.
    fn enforce_ordering(&mut self) {
        self.layers.sort_by_key(|d| match d.name() {
            "CacheMiddleware" => 0,
            "BlacklistMiddleware" => 1,
            _ => 2,
        });
    }

    /// Add or replace cache configuration, placed outermost.
    #[must_use]
    pub fn with_cache(mut self, cfg: &CacheConfig) -> Self {
        self.layers.retain(|d| d.name() != "CacheMiddleware");
        self.layers.insert(
            0,
            MiddlewareDescriptor::new(crate::cache::CacheMiddleware::new(cfg.clone())),
        );
        self.enforce_ordering();
        self
    }

    /// Remove cache if present.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.layers.retain(|d| d.name() != "CacheMiddleware");
        self
    }

    /// Add or replace blacklist configuration.
    #[must_use]
    pub fn with_blacklist(mut self, duration: Duration) -> Self {
        self.layers.retain(|d| d.name() != "BlacklistMiddleware");
        self.layers.push(MiddlewareDescriptor::new(
            crate::blacklist::BlacklistMiddleware::new(duration),
        ));
        self.enforce_ordering();
        self
    }

    /// Remove blacklist if present.
    #[must_use]
    pub fn without_blacklist(mut self) -> Self {
        self.layers.retain(|d| d.name() != "BlacklistMiddleware");
        self
    }

    /// Export the current middleware stack configuration for inspection.
    #[must_use]
    pub fn to_stack(&self) -> MiddlewareStack {
        let mut stack = MiddlewareStack::new();
        for desc in &self.layers {
            stack.push_inner(MiddlewareLayer::new(
                desc.name(),
                desc.middleware().config_json(),
            ));
        }
        stack.push_inner(MiddlewareLayer::new(
            "RawClient",
            serde_json::json!({ "name": self.raw.name() }),
        ));
        stack
    }

    /// Validate the middleware stack without building.
    ///
    /// # Errors
    /// Returns a [`GoszakupError::Validation`] if a layer fails its own checks.
    pub fn validate(&self) -> Result<(), GoszakupError> {
        for (idx, desc) in self.layers.iter().enumerate().rev() {
            let ctx = ValidationContext::new(&self.layers, idx);
            desc.middleware().validate(&ctx)?;
        }
        Ok(())
    }

    /// Build the wrapped client according to the captured stack.
    ///
    /// # Errors
    /// Returns a [`GoszakupError::Validation`] if the stack fails validation.
    pub fn build(self) -> Result<Arc<dyn UpstreamClient>, GoszakupError> {
        self.validate()?;
        let mut acc: Arc<dyn UpstreamClient> = Arc::clone(&self.raw);
        for desc in self.layers.into_iter().rev() {
            acc = desc.into_middleware().apply(acc);
        }
        Ok(acc)
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer<M: Middleware + 'static>(mut self, layer: M) -> Self {
        self.layers.insert(0, MiddlewareDescriptor::new(layer));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goszakup_mock::MockClient;
    use goszakup_types::Source;

    #[test]
    fn cache_sorts_outermost_of_blacklist_regardless_of_call_order() {
        let raw: Arc<dyn UpstreamClient> = Arc::new(MockClient::new("gql_v2", Source::GqlV2));
        let builder = ClientBuilder::new(raw)
            .with_blacklist(Duration::from_secs(60))
            .with_cache(&CacheConfig::default());

        let stack = builder.to_stack();
        assert_eq!(stack.layers[0].name, "CacheMiddleware");
        assert_eq!(stack.layers[1].name, "BlacklistMiddleware");
    }

    #[test]
    fn build_produces_a_working_client() {
        let raw: Arc<dyn UpstreamClient> = Arc::new(MockClient::new("gql_v2", Source::GqlV2));
        let client = ClientBuilder::new(raw)
            .with_cache(&CacheConfig::default())
            .with_blacklist(Duration::from_secs(60))
            .build()
            .expect("builds");
        assert_eq!(client.name(), "gql_v2");
    }
}
