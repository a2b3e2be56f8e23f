//! goszakup-core
//!
//! Core traits and utilities shared across the goszakup search engine:
//!
//! - `client`: the `UpstreamClient` trait and per-call context.
//! - `middleware`: the `Middleware` trait and stack-validation machinery.
//! - `dedup`: merge and de-duplication helpers for `LotResult`s.
//! - `util`: timeout/deadline helpers used by the orchestrator and clients.
#![warn(missing_docs)]

/// The `UpstreamClient` trait and per-call context types.
pub mod client;
/// De-duplication and ranking helpers for merged search results.
pub mod dedup;
/// Middleware trait and stack-validation machinery.
pub mod middleware;
/// Timeout and deadline helpers.
pub mod util;

pub use client::{CallContext, CallOrigin, UpstreamClient};
pub use dedup::{dedup_lots, sort_by_amount_desc};
pub use goszakup_types::GoszakupError;
pub use middleware::{Middleware, MiddlewareDescriptor, MiddlewarePosition, ValidationContext};
pub use util::{call_with_timeout, with_deadline};
