pub mod health;
pub mod market;
pub mod prediction;

use crate::AppState;
use axum::Router;
use btcpulse::error::{AppError, Result};
use serde::Serialize;

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// True when the data comes from the last poll rather than a fresh fetch.
    pub cached: bool,
}

impl<T> ApiResponse<T> {
    pub fn cached(data: T) -> Self {
        Self {
            data,
            meta: ApiMeta { cached: true },
        }
    }

    pub fn fresh(data: T) -> Self {
        Self {
            data,
            meta: ApiMeta { cached: false },
        }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/prediction", prediction::router())
        .nest("/api/market", market::router())
}

/// Upper-case a path symbol and make sure the poller tracks it.
pub(crate) fn tracked_symbol(state: &AppState, symbol: &str) -> Result<String> {
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!("Invalid symbol: {}", symbol)));
    }

    let symbol = symbol.to_uppercase();
    if !state.poller.tracks(&symbol) {
        return Err(AppError::NotFound(format!("Symbol not tracked: {}", symbol)));
    }
    Ok(symbol)
}
