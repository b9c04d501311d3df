use serde::{Deserialize, Serialize};

use super::{Candle, MarketTicker, PredictionResult};

/// Everything the dashboard needs for one symbol, replaced wholesale on every refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub symbol: String,
    pub prediction: PredictionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<MarketTicker>,
    /// Candle window the prediction was computed from (oldest first).
    pub candles: Vec<Candle>,
    /// Number of successful evaluations so far.
    pub analysis_count: u64,
    /// Unix timestamp (milliseconds) of the last successful refresh, 0 if none yet.
    pub updated_at: i64,
    /// Last fetch error, cleared on the next success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisSnapshot {
    /// Snapshot for a symbol that has not been evaluated yet.
    pub fn initializing(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            prediction: PredictionResult::initializing(),
            ticker: None,
            candles: Vec::new(),
            analysis_count: 0,
            updated_at: 0,
            error: None,
        }
    }

    /// Current state of the snapshot.
    pub fn status(&self) -> SnapshotStatus {
        match (&self.error, self.analysis_count) {
            (Some(_), _) => SnapshotStatus::Error,
            (None, 0) => SnapshotStatus::Initializing,
            (None, _) => SnapshotStatus::Ready,
        }
    }
}

/// Lifecycle of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Initializing,
    Ready,
    Error,
}
