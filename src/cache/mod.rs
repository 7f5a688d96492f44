//! Access-token cache.
//!
//! [`TokenCache`] hands out the current bearer token and performs at most one
//! authorize exchange at a time when the token is missing or stale.

pub mod token;
pub mod token_cache;
pub mod ttl;

use std::future::Future;
use std::sync::Arc;

use crate::errors::ConnectorError;

pub use token::CacheEntry;
pub use token_cache::TokenCache;
pub use ttl::TtlPolicy;

/// Anything that can produce a bearer token for an outbound request.
pub trait TokenProvider: Send + Sync {
    fn get_token(&self) -> impl Future<Output = Result<String, ConnectorError>> + Send;
}

impl<P: TokenProvider> TokenProvider for Arc<P> {
    fn get_token(&self) -> impl Future<Output = Result<String, ConnectorError>> + Send {
        (**self).get_token()
    }
}
