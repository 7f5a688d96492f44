use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::token::CacheEntry;
use crate::cache::ttl::TtlPolicy;
use crate::cache::TokenProvider;
use crate::errors::ConnectorError;
use crate::helpers::time::{from_epoch_seconds, get_instant, Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::sources::authorizer::Authorizer;

static FAST_PATH: &str = "fast";
static SLOW_PATH: &str = "slow";

/// Single-flight cache of the upstream access token.
///
/// Readers share `current` and never block each other while the token is
/// valid. A caller that finds it missing or stale takes `refresh_lock`,
/// re-checks, and only then calls the authorizer, so concurrent callers
/// wait for and reuse one refresh. Failures are returned to the caller that
/// ran the refresh and are never cached.
pub struct TokenCache<A> {
    authorizer: A,
    policy: TtlPolicy,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<CacheEntry>>>,
    refresh_lock: Mutex<()>,
}

impl<A: Authorizer> TokenCache<A> {
    pub fn new(authorizer: A, policy: TtlPolicy) -> Self {
        Self::with_clock(authorizer, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(authorizer: A, policy: TtlPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            authorizer,
            policy,
            clock,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    /// Current entry, valid or not.
    pub async fn snapshot(&self) -> Option<CacheEntry> {
        self.current.read().await.as_deref().cloned()
    }

    /// Installs a token obtained out of band, replacing the current entry.
    pub async fn prime(&self, token: impl Into<String>, valid_until: DateTime<Utc>) {
        let _guard = self.refresh_lock.lock().await;
        self.install(CacheEntry::new(token.into(), valid_until)).await;
    }

    async fn valid_token(&self) -> Option<String> {
        let now = self.clock.now();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_valid_at(now))
            .map(|entry| entry.token().to_owned())
    }

    /// Runs one authorize exchange. Caller must hold `refresh_lock`.
    async fn refresh(&self) -> Result<String, ConnectorError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        info!("access token missing or stale, authorizing");
        metrics.authorize_requests.inc();

        let response = self.authorizer.authorize().await.inspect_err(|err| {
            metrics
                .authorize_duration
                .observe(start.elapsed().as_secs_f64());
            metrics
                .authorize_failures
                .with_label_values(&[err.reason()])
                .inc();
            error!("authorize failed: {}", err);
        })?;
        metrics
            .authorize_duration
            .observe(start.elapsed().as_secs_f64());

        // taken after the round trip
        let now = self.clock.now();
        let expires_at = from_epoch_seconds(response.expiration).unwrap_or_else(|| {
            warn!(
                "upstream expiration {} is not a valid timestamp, applying minimum ttl",
                response.expiration
            );
            now
        });
        let valid_until = self.policy.valid_until(expires_at, now);

        let entry = CacheEntry::new(response.access_token, valid_until);
        let token = entry.token().to_owned();
        self.install(entry).await;
        info!("access token cached until {}", valid_until.to_rfc3339());
        Ok(token)
    }

    async fn install(&self, entry: CacheEntry) {
        get_metrics()
            .await
            .token_valid_until
            .set(entry.valid_until().timestamp());
        *self.current.write().await = Some(Arc::new(entry));
    }
}

impl<A: Authorizer> TokenProvider for TokenCache<A> {
    async fn get_token(&self) -> Result<String, ConnectorError> {
        let metrics = get_metrics().await;
        if let Some(token) = self.valid_token().await {
            metrics.token_cache_hits.with_label_values(&[FAST_PATH]).inc();
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.valid_token().await {
            debug!("access token was refreshed by a concurrent caller");
            metrics.token_cache_hits.with_label_values(&[SLOW_PATH]).inc();
            return Ok(token);
        }
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::sources::dto::AuthResponse;
    use crate::tests::common::{auth_response, ManualClock, StubAuthorizer};

    fn cache_with(authorizer: StubAuthorizer, clock: Arc<ManualClock>) -> TokenCache<StubAuthorizer> {
        TokenCache::with_clock(authorizer, TtlPolicy::new(60, 30), clock)
    }

    #[tokio::test]
    async fn returns_primed_token_without_authorizing() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = StubAuthorizer::failing();
        let cache = cache_with(authorizer, clock.clone());

        cache
            .prime("cached-token", clock.now() + TimeDelta::minutes(5))
            .await;

        assert_eq!(cache.get_token().await.unwrap(), "cached-token");
        assert_eq!(cache.authorizer().calls(), 0);
    }

    #[tokio::test]
    async fn cold_cache_authorizes_once_and_reuses_the_token() {
        let clock = Arc::new(ManualClock::new());
        let expiration = clock.now().timestamp() + 3600;
        let authorizer = StubAuthorizer::new(move |_| Ok(auth_response("fresh-token", expiration)));
        let cache = cache_with(authorizer, clock.clone());

        let first = cache.get_token().await.unwrap();
        let second = cache.get_token().await.unwrap();

        assert_eq!(first, "fresh-token");
        assert_eq!(second, "fresh-token");
        assert_eq!(cache.authorizer().calls(), 1);

        let entry = cache.snapshot().await.expect("entry installed");
        assert_eq!(
            entry.valid_until(),
            clock.now() + TimeDelta::seconds(3600 - 60)
        );
    }

    #[tokio::test]
    async fn failed_authorize_is_propagated_and_not_cached() {
        let clock = Arc::new(ManualClock::new());
        let expiration = clock.now().timestamp() + 3600;
        let authorizer = StubAuthorizer::new(move |call| match call {
            0 => Err(ConnectorError::Unauthorized("bad credentials".into())),
            _ => Ok(auth_response("second-try", expiration)),
        });
        let cache = cache_with(authorizer, clock);

        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Unauthorized(ref msg) if msg == "bad credentials"));
        assert!(cache.snapshot().await.is_none());

        assert_eq!(cache.get_token().await.unwrap(), "second-try");
        assert_eq!(cache.authorizer().calls(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_entry_untouched() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = StubAuthorizer::new(|_| Err(ConnectorError::Timeout("slow".into())));
        let cache = cache_with(authorizer, clock.clone());
        let stale_until = clock.now() + TimeDelta::seconds(1);
        cache.prime("old-token", stale_until).await;

        clock.advance(TimeDelta::seconds(2));
        let err = cache.get_token().await.unwrap_err();

        assert!(matches!(err, ConnectorError::Timeout(_)));
        let entry = cache.snapshot().await.unwrap();
        assert_eq!(entry.token(), "old-token");
        assert_eq!(entry.valid_until(), stale_until);
    }

    #[tokio::test]
    async fn out_of_range_expiration_falls_back_to_minimum_ttl() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = StubAuthorizer::new(|_| {
            Ok(AuthResponse {
                access_token: "odd".into(),
                expiration: i64::MAX,
            })
        });
        let cache = cache_with(authorizer, clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "odd");
        assert_eq!(
            cache.snapshot().await.unwrap().valid_until(),
            clock.now() + TimeDelta::seconds(30)
        );
    }
}
