use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::ttl::{MINIMUM_TTL_SECONDS_DEFAULT, RENEW_SKEW_SECONDS_DEFAULT};
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_SECS;

/// ================================
/// Mercado Bitcoin upstream
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct MercadoBitcoinConfig {
    /// e.g. https://api.mercadobitcoin.net/api/v4
    pub base_url: String,
    /// per-request timeout for authorize and data calls
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub auth: AuthConfig,
}

impl MercadoBitcoinConfig {
    /// Base url without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub login: String,
    pub password: String,
    /// subtracted from the upstream expiration before caching
    #[serde(default = "default_renew_skew_seconds")]
    pub renew_skew_seconds: u64,
    /// floor of the cached validity window
    #[serde(default = "default_minimum_ttl_seconds")]
    pub minimum_ttl_seconds: u64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("renew_skew_seconds", &self.renew_skew_seconds)
            .field("minimum_ttl_seconds", &self.minimum_ttl_seconds)
            .finish()
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_renew_skew_seconds() -> u64 {
    RENEW_SKEW_SECONDS_DEFAULT
}

fn default_minimum_ttl_seconds() -> u64 {
    MINIMUM_TTL_SECONDS_DEFAULT
}
