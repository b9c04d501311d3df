//! Market data sources.

pub mod binance;

pub use binance::BinanceClient;

use crate::error::Result;
use crate::types::{Candle, KlineInterval, MarketTicker};
use async_trait::async_trait;

/// Supplier of candle windows and 24h ticker data.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Source name for logs.
    fn name(&self) -> &str;

    /// Most recent `limit` candles for `symbol`, oldest first.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u16,
    ) -> Result<Vec<Candle>>;

    /// 24h ticker for `symbol`.
    async fn fetch_ticker(&self, symbol: &str) -> Result<MarketTicker>;
}
