use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::upstream::MercadoBitcoinConfig;
use crate::errors::ConnectorError;
use crate::sources::dto::AuthResponse;

/// Exchanges the configured credentials for an access token.
pub trait Authorizer: Send + Sync {
    fn authorize(&self) -> impl Future<Output = Result<AuthResponse, ConnectorError>> + Send;
}

#[derive(Serialize)]
struct AuthorizeRequest<'a> {
    login: &'a str,
    password: &'a str,
}

/// `POST {base_url}/authorize` with a JSON login/password body.
#[derive(Clone)]
pub struct HttpAuthorizer {
    client: Client,
    authorize_url: String,
    login: String,
    password: String,
    timeout: Duration,
}

impl HttpAuthorizer {
    pub fn new(client: Client, config: &MercadoBitcoinConfig) -> Self {
        Self {
            client,
            authorize_url: format!("{}/authorize", config.base_url()),
            login: config.auth.login.clone(),
            password: config.auth.password.clone(),
            timeout: config.timeout(),
        }
    }
}

impl fmt::Debug for HttpAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAuthorizer")
            .field("authorize_url", &self.authorize_url)
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Authorizer for HttpAuthorizer {
    async fn authorize(&self) -> Result<AuthResponse, ConnectorError> {
        debug!("POST {}", self.authorize_url);
        let response = self
            .client
            .post(&self.authorize_url)
            .timeout(self.timeout)
            .json(&AuthorizeRequest {
                login: &self.login,
                password: &self.password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::from_authorize_status(status, body));
        }

        let auth: AuthResponse = response.json().await?;
        info!("authorize ok, upstream expiration {}", auth.expiration);
        Ok(auth)
    }
}
