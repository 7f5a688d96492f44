use http::StatusCode;
use thiserror::Error;

/// Failures surfaced by the authorizer, the token cache and the API client.
///
/// The token cache has no error kind of its own: whatever the authorizer
/// returned is handed to the caller that triggered the refresh.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Upstream rejected the credentials or the bearer token (401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("upstream request timed out: {0}")]
    Timeout(String),

    /// Authorize exchange failed for a reason other than rejected credentials.
    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConnectorError {
    /// Classifies a non-2xx answer from the authorize endpoint.
    pub fn from_authorize_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ConnectorError::Unauthorized(format!("authorize returned {}", status))
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ConnectorError::Timeout(format!("authorize returned {}", status))
            }
            _ => ConnectorError::Authorization(format!("authorize returned {}: {}", status, body)),
        }
    }

    /// Classifies a non-2xx answer from a data endpoint.
    pub fn from_upstream_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ConnectorError::Unauthorized(format!("upstream returned {}", status))
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ConnectorError::Timeout(format!("upstream returned {}", status))
            }
            _ => ConnectorError::Upstream { status, body },
        }
    }

    /// Short label used for metric values.
    pub fn reason(&self) -> &'static str {
        match self {
            ConnectorError::Unauthorized(_) => "unauthorized",
            ConnectorError::Timeout(_) => "timeout",
            ConnectorError::Authorization(_) => "authorization",
            ConnectorError::Upstream { .. } => "upstream",
            ConnectorError::Transport(_) => "transport",
            ConnectorError::InvalidArgument(_) => "invalid_argument",
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectorError::Timeout(err.to_string())
        } else {
            ConnectorError::Transport(err)
        }
    }
}
