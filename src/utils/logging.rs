use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::types::ServiceConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Resolves the effective logging config; the CLI level wins over the file.
pub fn resolve_logging_config(
    service_config: &ServiceConfig,
    arg_log_level: Option<LogLevel>,
) -> LoggingConfig {
    let file_config = service_config
        .settings
        .logging
        .clone()
        .unwrap_or_default();

    match arg_log_level {
        Some(level) => LoggingConfig::new(level.as_str().to_owned(), file_config.format),
        None => file_config,
    }
}

pub fn run(service_config: &ServiceConfig, arg_log_level: Option<LogLevel>) -> Result<()> {
    let logging_config = resolve_logging_config(service_config, arg_log_level);
    init_logging(&logging_config);
    Ok(())
}

/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true)
                .with_ansi(false);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::proc_loader::parse_config;

    const YAML: &str = r#"
settings:
  server:
    host: 0.0.0.0
    port: "8080"
  logging:
    level: warn
    format: json
mercado_bitcoin:
  base_url: "https://api.mercadobitcoin.net/api/v4"
  auth:
    login: "id"
    password: "secret"
"#;

    #[tokio::test]
    async fn cli_level_overrides_file_level_but_keeps_format() {
        let cfg = parse_config(YAML.to_string()).await.unwrap();

        let from_file = resolve_logging_config(&cfg, None);
        assert_eq!(from_file.level, "warn");

        let from_cli = resolve_logging_config(&cfg, Some(LogLevel::Debug));
        assert_eq!(from_cli.level, "debug");
        assert!(matches!(from_cli.format, LogFormat::Json));
    }
}
