//! goszakup-middleware
//!
//! Client-side middleware wrapping [`goszakup_core::UpstreamClient`]
//! implementations: blacklist cool-downs on rate-limit signals, and response
//! caching. Per-user quota enforcement against the external billing service
//! lives in the orchestrator crate instead, since it gates a request before
//! any client is chosen rather than wrapping a specific client.
#![warn(missing_docs)]

mod blacklist;
mod builder;
mod cache;

pub use crate::blacklist::{BlacklistClient, BlacklistMiddleware};
pub use crate::builder::ClientBuilder;
pub use crate::cache::{CacheMiddleware, CachingClient};
