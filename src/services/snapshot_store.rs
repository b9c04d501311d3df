//! Latest analysis snapshot per symbol.

use crate::types::{AnalysisSnapshot, Candle, MarketTicker, PredictionResult};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Holds the most recent snapshot for each tracked symbol.
///
/// Snapshots are replaced wholesale; readers always get a clone of a complete
/// state, never a half-updated one.
pub struct SnapshotStore {
    /// Keyed by upper-case symbol.
    snapshots: DashMap<String, AnalysisSnapshot>,
}

impl SnapshotStore {
    /// Create a new, empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Start tracking a symbol with an initializing snapshot. No-op if already tracked.
    pub fn register(&self, symbol: &str) {
        let key = symbol.to_uppercase();
        self.snapshots
            .entry(key)
            .or_insert_with(|| AnalysisSnapshot::initializing(symbol));
    }

    /// Replace the snapshot after a successful fetch and evaluation.
    pub fn record_success(
        &self,
        symbol: &str,
        candles: Vec<Candle>,
        ticker: MarketTicker,
        prediction: PredictionResult,
    ) -> AnalysisSnapshot {
        let key = symbol.to_uppercase();
        let mut entry = self
            .snapshots
            .entry(key.clone())
            .or_insert_with(|| AnalysisSnapshot::initializing(symbol));
        let analysis_count = entry.analysis_count + 1;

        *entry = AnalysisSnapshot {
            symbol: key.clone(),
            prediction,
            ticker: Some(ticker),
            candles,
            analysis_count,
            updated_at: chrono::Utc::now().timestamp_millis(),
            error: None,
        };

        debug!(
            "Snapshot updated: {} #{} -> {}",
            key, entry.analysis_count, entry.prediction.signal
        );
        entry.value().clone()
    }

    /// Mark the latest refresh as failed. The previous prediction stays visible.
    pub fn record_failure(&self, symbol: &str, error: &str) {
        let key = symbol.to_uppercase();
        let mut entry = self
            .snapshots
            .entry(key)
            .or_insert_with(|| AnalysisSnapshot::initializing(symbol));
        entry.error = Some(error.to_string());
    }

    /// Get the snapshot for a symbol.
    pub fn get(&self, symbol: &str) -> Option<AnalysisSnapshot> {
        self.snapshots
            .get(&symbol.to_uppercase())
            .map(|s| s.value().clone())
    }

    /// All tracked symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.snapshots.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }
}
