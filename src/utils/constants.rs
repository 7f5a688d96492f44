//! Shared constants

pub const DEFAULT_CONFIG_PATH: &str = "mb-connector.yaml";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("mb-connector/", env!("CARGO_PKG_VERSION"));
