//! Integration tests for the snapshot store and poller

use async_trait::async_trait;
use btcpulse::sources::MarketDataSource;
use btcpulse::types::*;
use btcpulse::{AppError, PollingConfig, Poller, RefreshOutcome, Result, SnapshotStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source whose availability can be toggled between calls.
struct ToggleSource {
    closes: Vec<f64>,
    down: AtomicBool,
    calls: AtomicUsize,
}

impl ToggleSource {
    fn new(closes: Vec<f64>) -> Arc<Self> {
        Arc::new(Self {
            closes,
            down: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MarketDataSource for ToggleSource {
    fn name(&self) -> &str {
        "toggle"
    }

    async fn fetch_klines(
        &self,
        _symbol: &str,
        _interval: KlineInterval,
        _limit: u16,
    ) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("connection refused".to_string()));
        }
        Ok(self
            .closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 300, c, c, c, c, 5.0))
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

fn crash() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..59).map(|i| 200.0 - i as f64).collect();
    closes.push(100.0);
    closes
}

fn polling(symbols: &[&str], poll_interval_secs: u64) -> PollingConfig {
    PollingConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        poll_interval_secs,
        ..PollingConfig::default()
    }
}

#[tokio::test]
async fn test_failure_keeps_last_good_prediction() {
    let source = ToggleSource::new(crash());
    let store = SnapshotStore::new();
    let poller = Poller::new(source.clone(), store.clone(), polling(&["BTCUSDT"], 30));

    assert!(matches!(poller.refresh("BTCUSDT").await, RefreshOutcome::Updated(_)));
    let good = store.get("BTCUSDT").unwrap();
    assert_eq!(good.prediction.signal, TradeSignal::Buy);

    source.down.store(true, Ordering::SeqCst);
    assert!(matches!(poller.refresh("BTCUSDT").await, RefreshOutcome::Failed(_)));

    let after = store.get("BTCUSDT").unwrap();
    assert_eq!(after.prediction, good.prediction);
    assert_eq!(after.analysis_count, 1);
    assert_eq!(after.status(), SnapshotStatus::Error);
    assert!(after.error.as_deref().unwrap().contains("connection refused"));

    source.down.store(false, Ordering::SeqCst);
    poller.refresh("BTCUSDT").await;

    let recovered = store.get("BTCUSDT").unwrap();
    assert_eq!(recovered.status(), SnapshotStatus::Ready);
    assert_eq!(recovered.analysis_count, 2);
}

#[tokio::test]
async fn test_spawned_loop_refreshes_every_symbol() {
    let source = ToggleSource::new(crash());
    let store = SnapshotStore::new();
    let poller = Poller::new(
        source.clone(),
        store.clone(),
        polling(&["BTCUSDT", "ETHUSDT"], 3600),
    );

    let handle = poller.spawn();
    for _ in 0..50 {
        if store.symbols().iter().all(|s| store.get(s).unwrap().analysis_count > 0) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert_eq!(store.symbols(), vec!["BTCUSDT", "ETHUSDT"]);
    for symbol in store.symbols() {
        let snapshot = store.get(&symbol).unwrap();
        assert_eq!(snapshot.analysis_count, 1, "{}", symbol);
        assert_eq!(snapshot.prediction.confidence, 83);
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_store_starts_initializing() {
    let store = SnapshotStore::new();
    store.register("solusdt");

    let snapshot = store.get("SOLUSDT").unwrap();
    assert_eq!(snapshot.prediction, PredictionResult::initializing());
    assert!(snapshot.candles.is_empty());
    assert_eq!(snapshot.status(), SnapshotStatus::Initializing);
}
