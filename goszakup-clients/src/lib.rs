//! goszakup-clients
//!
//! Upstream clients for the four procurement data sources: GraphQL v2,
//! GraphQL v3, REST v3, and the optional webhook relay. Each implements
//! `goszakup_core::UpstreamClient` over a transport shared across clients
//! (`http::build_shared_client`).
#![warn(missing_docs)]

/// Filter translation from `SearchQuery` into each protocol's native shape.
pub mod filter;
/// Shared GraphQL POST plumbing.
mod gql;
/// GraphQL v2 client.
pub mod gql_v2;
/// GraphQL v3 client.
pub mod gql_v3;
/// Shared transport construction, error mapping, and retry/backoff.
pub mod http;
/// Wire shapes and their mapping onto `LotResult`.
pub mod mapping;
/// REST v3 client.
pub mod rest_v3;
/// Optional webhook relay client.
pub mod webhook;

pub use gql_v2::GqlV2Client;
pub use gql_v3::GqlV3Client;
pub use http::build_shared_client;
pub use rest_v3::RestV3Client;
pub use webhook::WebhookClient;
