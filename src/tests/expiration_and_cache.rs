#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::TimeDelta;

    use crate::cache::{TokenCache, TokenProvider, TtlPolicy};
    use crate::helpers::time::Clock;
    use crate::tests::common::{auth_response, ManualClock, StubAuthorizer};

    fn numbered_tokens(clock: &ManualClock, expires_in: i64) -> StubAuthorizer {
        let expiration = clock.now().timestamp() + expires_in;
        StubAuthorizer::new(move |call| Ok(auth_response(&format!("token-{}", call), expiration)))
    }

    #[tokio::test]
    async fn short_lived_token_is_held_for_the_minimum_ttl() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = numbered_tokens(&clock, 10);
        let cache = TokenCache::with_clock(authorizer, TtlPolicy::new(60, 30), clock.clone());

        let start = clock.now();
        assert_eq!(cache.get_token().await.unwrap(), "token-0");
        assert_eq!(
            cache.snapshot().await.unwrap().valid_until(),
            start + TimeDelta::seconds(30)
        );

        clock.advance(TimeDelta::milliseconds(1500));
        assert_eq!(cache.get_token().await.unwrap(), "token-0");

        clock.advance(TimeDelta::milliseconds(28_499));
        assert_eq!(cache.get_token().await.unwrap(), "token-0");
        assert_eq!(cache.authorizer().calls(), 1);
    }

    #[tokio::test]
    async fn stale_token_triggers_exactly_one_renewal() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = numbered_tokens(&clock, 10);
        let cache = TokenCache::with_clock(authorizer, TtlPolicy::new(60, 30), clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "token-0");

        clock.advance(TimeDelta::seconds(31));
        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(cache.authorizer().calls(), 2);
    }

    #[tokio::test]
    async fn long_lived_token_is_renewed_skew_seconds_early() {
        let clock = Arc::new(ManualClock::new());
        let authorizer = numbered_tokens(&clock, 3600);
        let cache = TokenCache::with_clock(authorizer, TtlPolicy::new(60, 30), clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "token-0");

        clock.advance(TimeDelta::seconds(3539));
        assert_eq!(cache.get_token().await.unwrap(), "token-0");

        // valid_until is exclusive
        clock.advance(TimeDelta::seconds(1));
        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(cache.authorizer().calls(), 2);
    }
}
