//! Fixed-cadence market data refresh.
//!
//! Each tick fetches a fresh candle window and ticker per symbol, runs the
//! prediction engine and replaces the stored snapshot. A refresh that starts
//! while another one for the same symbol is still in flight is dropped.

use crate::config::PollingConfig;
use crate::services::analysis::PredictionEngine;
use crate::services::SnapshotStore;
use crate::sources::MarketDataSource;
use crate::types::PredictionResult;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Result of a single refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Data fetched and evaluated.
    Updated(PredictionResult),
    /// Fetch failed; the engine was not called.
    Failed(String),
    /// Another refresh for the symbol was already running.
    Skipped,
}

/// Marks a symbol as in flight until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, ()>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// Periodically refreshes snapshots from a market data source.
pub struct Poller {
    source: Arc<dyn MarketDataSource>,
    store: Arc<SnapshotStore>,
    config: PollingConfig,
    in_flight: DashMap<String, ()>,
}

impl Poller {
    /// Create a poller and register every configured symbol with the store.
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<SnapshotStore>,
        config: PollingConfig,
    ) -> Arc<Self> {
        for symbol in &config.symbols {
            store.register(symbol);
        }

        Arc::new(Self {
            source,
            store,
            config,
            in_flight: DashMap::new(),
        })
    }

    /// Whether `symbol` is one of the configured symbols.
    pub fn tracks(&self, symbol: &str) -> bool {
        let symbol = symbol.to_uppercase();
        self.config.symbols.iter().any(|s| *s == symbol)
    }

    fn try_acquire(&self, symbol: &str) -> Option<InFlightGuard<'_>> {
        let key = symbol.to_uppercase();
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    in_flight: &self.in_flight,
                    key,
                })
            }
        }
    }

    /// Fetch, evaluate and store one symbol.
    pub async fn refresh(&self, symbol: &str) -> RefreshOutcome {
        let Some(_guard) = self.try_acquire(symbol) else {
            debug!("Refresh for {} already in flight, dropping", symbol);
            return RefreshOutcome::Skipped;
        };

        let fetched = tokio::try_join!(
            self.source
                .fetch_klines(symbol, self.config.interval, self.config.candle_limit),
            self.source.fetch_ticker(symbol),
        );

        match fetched {
            Ok((candles, ticker)) => {
                let prediction = PredictionEngine::evaluate(&candles);
                if prediction.signal.is_actionable() {
                    info!(
                        "{} {}: {} ({}% confidence, target {:?}, stop {:?})",
                        self.source.name(),
                        symbol,
                        prediction.signal,
                        prediction.confidence,
                        prediction.target_price,
                        prediction.stop_loss
                    );
                } else {
                    debug!(
                        "{} {}: {} ({}% confidence, {} candles)",
                        self.source.name(),
                        symbol,
                        prediction.signal,
                        prediction.confidence,
                        candles.len()
                    );
                }
                self.store
                    .record_success(symbol, candles, ticker, prediction.clone());
                RefreshOutcome::Updated(prediction)
            }
            Err(e) => {
                error!("{} fetch error for {}: {}", self.source.name(), symbol, e);
                let message = e.to_string();
                self.store.record_failure(symbol, &message);
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Refresh every configured symbol concurrently.
    pub async fn refresh_all(&self) -> Vec<RefreshOutcome> {
        let refreshes = self.config.symbols.iter().map(|symbol| self.refresh(symbol));
        join_all(refreshes).await
    }

    /// Run the refresh loop on the current runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Starting market polling every {}s for {:?}",
                self.config.poll_interval_secs, self.config.symbols
            );

            let mut ticker = tokio::time::interval(self.config.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                self.refresh_all().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::types::{Candle, KlineInterval, MarketTicker, SnapshotStatus, TradeSignal};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeSource {
        closes: Vec<f64>,
        fail: bool,
        delay: Duration,
        kline_calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_closes(closes: Vec<f64>) -> Self {
            Self {
                closes,
                fail: false,
                delay: Duration::ZERO,
                kline_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_closes(Vec::new())
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_klines(
            &self,
            _symbol: &str,
            _interval: KlineInterval,
            limit: u16,
        ) -> Result<Vec<Candle>> {
            self.kline_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(AppError::ExternalApi("Binance API error: 503".to_string()));
            }
            let skip = self.closes.len().saturating_sub(limit as usize);
            Ok(self
                .closes
                .iter()
                .skip(skip)
                .enumerate()
                .map(|(i, &c)| Candle::new(1_700_000_000 + i as i64 * 300, c, c, c, c, 10.0))
                .collect())
        }

        async fn fetch_ticker(&self, symbol: &str) -> Result<MarketTicker> {
            Ok(MarketTicker {
                symbol: symbol.to_string(),
                price: self.closes.last().copied().unwrap_or_default(),
                change_24h: 0.0,
                volume_24h: 0.0,
                market_cap: 0.0,
            })
        }
    }

    fn config(symbols: &[&str]) -> PollingConfig {
        PollingConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            ..PollingConfig::default()
        }
    }

    fn spike() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..59).map(|i| 100.0 + i as f64).collect();
        closes.push(200.0);
        closes
    }

    #[tokio::test]
    async fn test_new_registers_symbols() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::with_closes(spike())),
            store.clone(),
            config(&["BTCUSDT", "ETHUSDT"]),
        );

        assert_eq!(store.len(), 2);
        assert!(poller.tracks("btcusdt"));
        assert!(!poller.tracks("DOGEUSDT"));
        let snapshot = store.get("ETHUSDT").unwrap();
        assert_eq!(snapshot.status(), SnapshotStatus::Initializing);
    }

    #[tokio::test]
    async fn test_refresh_updates_snapshot() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::with_closes(spike())),
            store.clone(),
            config(&["BTCUSDT"]),
        );

        let outcome = poller.refresh("BTCUSDT").await;
        let RefreshOutcome::Updated(prediction) = outcome else {
            panic!("expected update, got {:?}", outcome);
        };
        assert_eq!(prediction.signal, TradeSignal::Sell);
        assert_eq!(prediction.confidence, 83);

        let snapshot = store.get("BTCUSDT").unwrap();
        assert_eq!(snapshot.status(), SnapshotStatus::Ready);
        assert_eq!(snapshot.analysis_count, 1);
        assert_eq!(snapshot.candles.len(), 60);
        assert_eq!(snapshot.ticker.unwrap().price, 200.0);
    }

    #[tokio::test]
    async fn test_refresh_short_window_is_insufficient() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::with_closes(vec![100.0; 20])),
            store.clone(),
            config(&["BTCUSDT"]),
        );

        poller.refresh("BTCUSDT").await;
        let snapshot = store.get("BTCUSDT").unwrap();
        assert_eq!(snapshot.prediction, PredictionResult::insufficient_data());
    }

    #[tokio::test]
    async fn test_refresh_failure_records_error() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::failing()),
            store.clone(),
            config(&["BTCUSDT"]),
        );

        let outcome = poller.refresh("BTCUSDT").await;
        assert!(matches!(outcome, RefreshOutcome::Failed(ref m) if m.contains("503")));

        let snapshot = store.get("BTCUSDT").unwrap();
        assert_eq!(snapshot.status(), SnapshotStatus::Error);
        assert_eq!(snapshot.analysis_count, 0);
        assert_eq!(snapshot.prediction, PredictionResult::initializing());
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_dropped() {
        let source = Arc::new(FakeSource {
            delay: Duration::from_millis(50),
            ..FakeSource::with_closes(spike())
        });
        let store = SnapshotStore::new();
        let poller = Poller::new(source.clone(), store.clone(), config(&["BTCUSDT"]));

        let (first, second) = tokio::join!(poller.refresh("BTCUSDT"), poller.refresh("btcusdt"));

        assert!(matches!(first, RefreshOutcome::Updated(_)));
        assert_eq!(second, RefreshOutcome::Skipped);
        assert_eq!(source.kline_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("BTCUSDT").unwrap().analysis_count, 1);
    }

    #[tokio::test]
    async fn test_refresh_releases_in_flight_slot() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::with_closes(spike())),
            store.clone(),
            config(&["BTCUSDT"]),
        );

        poller.refresh("BTCUSDT").await;
        poller.refresh("BTCUSDT").await;
        assert_eq!(store.get("BTCUSDT").unwrap().analysis_count, 2);
    }

    #[tokio::test]
    async fn test_refresh_all_covers_every_symbol() {
        let store = SnapshotStore::new();
        let poller = Poller::new(
            Arc::new(FakeSource::with_closes(spike())),
            store.clone(),
            config(&["BTCUSDT", "ETHUSDT"]),
        );

        let outcomes = poller.refresh_all().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| matches!(o, RefreshOutcome::Updated(_))));
        assert_eq!(store.get("ETHUSDT").unwrap().analysis_count, 1);
    }
}
