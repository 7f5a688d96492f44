use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::cache::TokenProvider;
use crate::config::upstream::MercadoBitcoinConfig;
use crate::errors::ConnectorError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::dto::{Account, Position};

static ACCOUNTS_ENDPOINT: &str = "accounts";
static POSITIONS_ENDPOINT: &str = "positions";

/// Bearer-authenticated client for the account and position endpoints.
pub struct MbApiClient<P> {
    client: Client,
    base_url: String,
    timeout: Duration,
    tokens: Arc<P>,
}

impl<P: TokenProvider> MbApiClient<P> {
    pub fn new(client: Client, config: &MercadoBitcoinConfig, tokens: Arc<P>) -> Self {
        Self {
            client,
            base_url: config.base_url().to_owned(),
            timeout: config.timeout(),
            tokens,
        }
    }

    /// `GET {base_url}/accounts`
    pub async fn get_accounts(&self) -> Result<Vec<Account>, ConnectorError> {
        let url = self.url(&[ACCOUNTS_ENDPOINT])?;
        self.get_json(ACCOUNTS_ENDPOINT, url, None).await
    }

    /// `GET {base_url}/accounts/{account_id}/positions[?symbols=...]`
    pub async fn get_positions(
        &self,
        account_id: &str,
        symbols: Option<&str>,
    ) -> Result<Vec<Position>, ConnectorError> {
        if account_id.trim().is_empty() {
            return Err(ConnectorError::InvalidArgument(
                "account id must not be empty".to_string(),
            ));
        }
        let url = self.url(&[ACCOUNTS_ENDPOINT, account_id, POSITIONS_ENDPOINT])?;
        let symbols = symbols.map(str::trim).filter(|s| !s.is_empty());
        self.get_json(POSITIONS_ENDPOINT, url, symbols).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ConnectorError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ConnectorError::InvalidArgument(format!("invalid base url '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ConnectorError::InvalidArgument(format!(
                    "base url '{}' cannot have path segments",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: Url,
        symbols: Option<&str>,
    ) -> Result<T, ConnectorError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics
            .upstream_requests
            .with_label_values(&[endpoint])
            .inc();

        let result = self.send(url, symbols).await;

        metrics
            .upstream_duration
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            metrics
                .upstream_failures
                .with_label_values(&[endpoint, err.reason()])
                .inc();
            error!("GET {} failed: {}", endpoint, err);
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: Url,
        symbols: Option<&str>,
    ) -> Result<T, ConnectorError> {
        let token = self.tokens.get_token().await?;

        let mut request = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .timeout(self.timeout);
        if let Some(symbols) = symbols {
            request = request.query(&[("symbols", symbols)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::from_upstream_status(status, body));
        }
        info!("GET {} -> {}", url.path(), status);
        Ok(response.json().await?)
    }
}
