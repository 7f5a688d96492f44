use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::Router;
use prometheus::Registry;
use tracing::{error, info};

use crate::cache::TokenProvider;
use crate::config::settings::{MetricsConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::server::routes;
use crate::sources::api_client::MbApiClient;

pub struct AppState<P> {
    pub api: Arc<MbApiClient<P>>,
}

impl<P> AppState<P> {
    pub fn new(api: MbApiClient<P>) -> Self {
        Self { api: Arc::new(api) }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

/// API routes plus the metrics route when enabled.
pub fn router<P: TokenProvider + 'static>(
    state: AppState<P>,
    metrics_config: &MetricsConfig,
    registry: Registry,
) -> Router {
    Router::new()
        .merge(routes::router::<P>())
        .merge(MetricsState::new(registry).router(metrics_config))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn start<P: TokenProvider + 'static>(
    settings_config: &SettingsConfig,
    state: AppState<P>,
) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(state, &settings_config.metrics, metrics.registry.clone());

    let bind_addr = format!(
        "{}:{}",
        settings_config.server.host, settings_config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", bind_addr, e))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    metrics.up.set(0);

    served.map_err(|e| anyhow!("server failed: {}", e))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!("cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
