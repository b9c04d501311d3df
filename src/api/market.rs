use super::{tracked_symbol, ApiResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use btcpulse::error::{AppError, Result};
use btcpulse::types::{Candle, MarketTicker};
use serde::Serialize;

/// Candle window as served to the chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlesResponse {
    pub symbol: String,
    pub interval: &'static str,
    /// Candle length in seconds, for bucketing on the chart axis.
    pub interval_secs: i64,
    pub candles: Vec<Candle>,
}

/// GET /api/market/:symbol
async fn get_ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<MarketTicker>>> {
    let symbol = tracked_symbol(&state, &symbol)?;
    let ticker = state
        .store
        .get(&symbol)
        .and_then(|snapshot| snapshot.ticker)
        .ok_or_else(|| AppError::NotFound(format!("No market data for {}", symbol)))?;

    Ok(Json(ApiResponse::cached(ticker)))
}

/// GET /api/market/:symbol/candles
async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<CandlesResponse>>> {
    let symbol = tracked_symbol(&state, &symbol)?;
    let candles = state
        .store
        .get(&symbol)
        .map(|snapshot| snapshot.candles)
        .unwrap_or_default();

    Ok(Json(ApiResponse::cached(CandlesResponse {
        symbol,
        interval: state.config.polling.interval.as_str(),
        interval_secs: state.config.polling.interval.seconds(),
        candles,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_ticker))
        .route("/:symbol/candles", get(get_candles))
}
