use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::config::upstream::MercadoBitcoinConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub mercado_bitcoin: MercadoBitcoinConfig,
}
