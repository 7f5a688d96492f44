use chrono::{DateTime, TimeDelta, Utc};

use crate::config::upstream::AuthConfig;

pub const RENEW_SKEW_SECONDS_DEFAULT: u64 = 60;
pub const MINIMUM_TTL_SECONDS_DEFAULT: u64 = 30;

/// Turns an upstream expiry into the local validity window of a cache entry.
///
/// `ttl = max(expires_at - now - renew_skew, minimum_ttl)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    renew_skew: TimeDelta,
    minimum_ttl: TimeDelta,
}

impl TtlPolicy {
    pub fn new(renew_skew_seconds: u64, minimum_ttl_seconds: u64) -> Self {
        Self {
            renew_skew: seconds(renew_skew_seconds),
            minimum_ttl: seconds(minimum_ttl_seconds),
        }
    }

    pub fn renew_skew(&self) -> TimeDelta {
        self.renew_skew
    }

    pub fn minimum_ttl(&self) -> TimeDelta {
        self.minimum_ttl
    }

    pub fn effective_ttl(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> TimeDelta {
        let raw_ttl = expires_at
            .signed_duration_since(now)
            .checked_sub(&self.renew_skew)
            .unwrap_or(TimeDelta::MIN);
        raw_ttl.max(self.minimum_ttl)
    }

    /// Must be evaluated with `now` taken after the authorize round trip.
    pub fn valid_until(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.effective_ttl(expires_at, now))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(RENEW_SKEW_SECONDS_DEFAULT, MINIMUM_TTL_SECONDS_DEFAULT)
    }
}

impl From<&AuthConfig> for TtlPolicy {
    fn from(auth: &AuthConfig) -> Self {
        Self::new(auth.renew_skew_seconds, auth.minimum_ttl_seconds)
    }
}

fn seconds(value: u64) -> TimeDelta {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
