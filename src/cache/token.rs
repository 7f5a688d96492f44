use chrono::{DateTime, Utc};

/// A bearer token together with the instant until which it may be handed out.
///
/// Entries are never mutated; a refresh installs a new one in place of the old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    token: String,
    valid_until: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(token: String, valid_until: DateTime<Utc>) -> Self {
        Self { token, valid_until }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }
}
