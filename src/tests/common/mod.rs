// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;

use crate::cache::TokenProvider;
use crate::config::upstream::{AuthConfig, MercadoBitcoinConfig};
use crate::errors::ConnectorError;
use crate::helpers::time::Clock;
use crate::sources::authorizer::Authorizer;
use crate::sources::dto::AuthResponse;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn upstream_config(base_url: &str, login: &str, password: &str) -> MercadoBitcoinConfig {
    MercadoBitcoinConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        auth: AuthConfig {
            login: login.to_string(),
            password: password.to_string(),
            renew_skew_seconds: 60,
            minimum_ttl_seconds: 30,
        },
    }
}

pub fn auth_response(token: &str, expiration: i64) -> AuthResponse {
    AuthResponse {
        access_token: token.to_string(),
        expiration,
    }
}

/// Clock that only moves when told to. Starts on a whole second so that
/// epoch-second expirations line up exactly.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_700_000_000, 0).expect("valid start");
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

type Script = dyn Fn(usize) -> Result<AuthResponse, ConnectorError> + Send + Sync;

/// Authorizer answering from a closure keyed by the zero-based call number.
/// Counts calls and the highest number of overlapping calls.
pub struct StubAuthorizer {
    script: Box<Script>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubAuthorizer {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(usize) -> Result<AuthResponse, ConnectorError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fails every call; for caches that must never authorize.
    pub fn failing() -> Self {
        Self::new(|_| {
            Err(ConnectorError::Authorization(
                "stub authorizer called".to_string(),
            ))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Authorizer for StubAuthorizer {
    async fn authorize(&self) -> Result<AuthResponse, ConnectorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.script)(call)
    }
}

/// Token provider that always hands out the same token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<String, ConnectorError> {
        Ok(self.token.clone())
    }
}
