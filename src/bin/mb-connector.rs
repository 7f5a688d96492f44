use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mb_connector::observability::service_resources_metrics::collect_process_metrics;
use mb_connector::server::server::{self, AppState};
use mb_connector::sources::{HttpAuthorizer, MbApiClient};
use mb_connector::utils::constants::{DEFAULT_CONFIG_PATH, USER_AGENT};
use mb_connector::utils::logging::{self, LogLevel};
use mb_connector::utils::config_loader;
use mb_connector::{TokenCache, TtlPolicy};
use reqwest::Client;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Create request client, shared by authorize and data calls
    // -------------------------------

    let client = Client::builder().user_agent(USER_AGENT).build()?;

    // -------------------------------
    // 3. Token cache in front of the authorize exchange
    // -------------------------------

    let upstream = &service_config.mercado_bitcoin;
    let authorizer = HttpAuthorizer::new(client.clone(), upstream);
    let tokens = Arc::new(TokenCache::new(
        authorizer,
        TtlPolicy::from(&upstream.auth),
    ));

    // -------------------------------
    // 4. Process metrics
    // -------------------------------

    let metrics_enabled = service_config.settings.metrics.is_enabled;
    let process_metrics = tokio::spawn(async move {
        if let Err(e) = collect_process_metrics(metrics_enabled).await {
            error!("process metrics stopped: {}", e);
        }
    });

    // -------------------------------
    // 5. Start http server
    // -------------------------------

    let state = AppState::new(MbApiClient::new(client, upstream, tokens));
    info!("Service starting...");
    let served = server::start(&service_config.settings, state).await;

    process_metrics.abort();
    info!("Service stopped");
    served
}
