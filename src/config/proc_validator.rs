//! Configuration validation with aggregated errors.
//! Every issue is collected so a broken file is reported in one pass.

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::config::upstream::MercadoBitcoinConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_mercado_bitcoin(&cfg.mercado_bitcoin, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        return Ok(());
    }

    let metrics = get_metrics().await;
    metrics.config_validation_errors.inc_by(errors.len() as u64);
    for e in &errors {
        error!("config validation: {}", e);
    }
    Err(errors)
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }
    if !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_mercado_bitcoin(cfg: &MercadoBitcoinConfig, errors: &mut Vec<String>) {
    match Url::parse(cfg.base_url()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "mercado_bitcoin.base_url scheme '{}' is not http(s)",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "mercado_bitcoin.base_url '{}' is invalid: {}",
            cfg.base_url, e
        )),
    }
    if cfg.timeout_seconds == 0 {
        errors.push("mercado_bitcoin.timeout_seconds must be > 0".to_string());
    }
    if cfg.auth.login.trim().is_empty() {
        errors.push("mercado_bitcoin.auth.login must not be empty".to_string());
    }
    if cfg.auth.password.is_empty() {
        errors.push("mercado_bitcoin.auth.password must not be empty".to_string());
    }
    if cfg.auth.minimum_ttl_seconds == 0 {
        errors.push("mercado_bitcoin.auth.minimum_ttl_seconds must be > 0".to_string());
    }
}
