//! Upstream Mercado Bitcoin API: the authorize exchange, the data client and
//! the wire types they share.

pub mod api_client;
pub mod authorizer;
pub mod dto;

pub use api_client::MbApiClient;
pub use authorizer::{Authorizer, HttpAuthorizer};
