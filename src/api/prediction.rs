use super::{tracked_symbol, ApiResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use btcpulse::error::{AppError, Result};
use btcpulse::types::{AnalysisSnapshot, IndicatorBundle, INSUFFICIENT_DATA_REASON};
use btcpulse::{PredictionEngine, RefreshOutcome};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// False when a refresh for the symbol was already running.
    pub refreshed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Every tracked symbol is registered with the store when the poller starts.
fn missing_snapshot(symbol: &str) -> AppError {
    AppError::Internal(format!("No snapshot registered for {}", symbol))
}

/// GET /api/prediction/:symbol
async fn get_prediction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<AnalysisSnapshot>>> {
    let symbol = tracked_symbol(&state, &symbol)?;
    let snapshot = state
        .store
        .get(&symbol)
        .ok_or_else(|| missing_snapshot(&symbol))?;

    Ok(Json(ApiResponse::cached(snapshot)))
}

/// GET /api/prediction/:symbol/indicators
async fn get_indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<IndicatorBundle>>> {
    let symbol = tracked_symbol(&state, &symbol)?;
    let snapshot = state
        .store
        .get(&symbol)
        .ok_or_else(|| missing_snapshot(&symbol))?;

    let bundle = PredictionEngine::indicators(&snapshot.candles)
        .ok_or_else(|| AppError::NotFound(INSUFFICIENT_DATA_REASON.to_string()))?;

    Ok(Json(ApiResponse::cached(bundle)))
}

/// POST /api/prediction/:symbol/refresh
async fn refresh_prediction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<RefreshResponse>>> {
    let symbol = tracked_symbol(&state, &symbol)?;
    info!("On-demand refresh requested for {}", symbol);

    let response = match state.poller.refresh(&symbol).await {
        RefreshOutcome::Updated(_) => RefreshResponse {
            refreshed: true,
            error: None,
        },
        RefreshOutcome::Failed(error) => RefreshResponse {
            refreshed: false,
            error: Some(error),
        },
        RefreshOutcome::Skipped => RefreshResponse {
            refreshed: false,
            error: None,
        },
    };

    Ok(Json(ApiResponse::fresh(response)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_prediction))
        .route("/:symbol/indicators", get(get_indicators))
        .route("/:symbol/refresh", post(refresh_prediction))
}
