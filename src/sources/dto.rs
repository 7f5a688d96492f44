use serde::{Deserialize, Serialize};

/// Response of `POST /authorize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// UNIX TIMESTAMP
    pub expiration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "currencySign", default)]
    pub currency_sign: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
}

/// Open position of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "avgPrice", default)]
    pub avg_price: f64,
    #[serde(default)]
    pub category: String,
    pub id: String,
    #[serde(default)]
    pub instrument: String,
    #[serde(rename = "qty", default)]
    pub quantity: f64,
    #[serde(default)]
    pub side: String,
}
