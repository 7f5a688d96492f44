use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::cache::TokenProvider;
use crate::errors::ConnectorError;
use crate::server::server::AppState;
use crate::sources::dto::{Account, Position};

pub const ACCOUNTS_PATH: &str = "/mercadobitcoin/accounts";
pub const POSITIONS_PATH: &str = "/mercadobitcoin/accounts/{account_id}/positions";

#[derive(Debug, Deserialize)]
pub struct PositionsQuery {
    pub symbols: Option<String>,
}

pub fn router<P: TokenProvider + 'static>() -> Router<AppState<P>> {
    info!("served path: {}", ACCOUNTS_PATH);
    info!("served path: {}", POSITIONS_PATH);
    Router::new()
        .route(ACCOUNTS_PATH, get(get_accounts::<P>))
        .route(POSITIONS_PATH, get(get_positions::<P>))
}

/// Accounts linked to the configured login.
async fn get_accounts<P: TokenProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Json<Vec<Account>>, ConnectorError> {
    let accounts = state.api.get_accounts().await?;
    Ok(Json(accounts))
}

/// Open positions of an account, optionally filtered by `symbols`.
async fn get_positions<P: TokenProvider + 'static>(
    State(state): State<AppState<P>>,
    Path(account_id): Path<String>,
    Query(query): Query<PositionsQuery>,
) -> Result<Json<Vec<Position>>, ConnectorError> {
    let positions = state
        .api
        .get_positions(&account_id, query.symbols.as_deref())
        .await?;
    Ok(Json(positions))
}
