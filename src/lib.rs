//! # Mercado Bitcoin connector
//!
//! Exposes the accounts and positions of a Mercado Bitcoin login over HTTP.
//! Every upstream call carries a bearer token obtained from a login/password
//! authorize exchange and cached until shortly before it expires.
//!
//! Modules:
//! - `cache`: single-flight access-token cache and its TTL policy
//! - `sources`: upstream authorizer, data client and wire types
//! - `server`: axum routes and error-to-status mapping
//! - `config`: YAML service configuration, loading and validation
//! - `observability`: prometheus metrics

pub mod cache;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::{TokenCache, TokenProvider, TtlPolicy};
pub use crate::config::types::ServiceConfig;
pub use crate::errors::ConnectorError;
