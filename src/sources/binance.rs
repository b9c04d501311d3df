use super::MarketDataSource;
use crate::error::{AppError, Result};
use crate::types::{Candle, KlineInterval, MarketTicker};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// How much of a failed response body goes into the log.
const ERROR_BODY_LOG_CHARS: usize = 200;

/// Binance 24hr ticker response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    volume: String,
}

impl BinanceTicker {
    fn into_market_ticker(self) -> Result<MarketTicker> {
        Ok(MarketTicker {
            price: parse_decimal(&self.last_price, "lastPrice")?,
            change_24h: parse_decimal(&self.price_change_percent, "priceChangePercent")?,
            volume_24h: parse_decimal(&self.volume, "volume")?,
            market_cap: 0.0,
            symbol: self.symbol,
        })
    }
}

/// Binance REST client.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent("btcpulse/1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.client.get(&url).query(query);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance API returned {}: {}",
                status,
                truncate_chars(&text, ERROR_BODY_LOG_CHARS)
            );
            return Err(AppError::ExternalApi(format!("Binance API error: {}", status)));
        }

        Ok(response)
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: u16,
    ) -> Result<Vec<Candle>> {
        let limit = limit.to_string();
        let response = self
            .get(
                "klines",
                &[
                    ("symbol", symbol),
                    ("interval", interval.as_str()),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;

        let rows: Vec<Vec<Value>> = response.json().await?;
        let candles = parse_klines(&rows)?;
        debug!("Binance klines: {} {} x{}", symbol, interval, candles.len());
        Ok(candles)
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<MarketTicker> {
        let response = self.get("ticker/24hr", &[("symbol", symbol)]).await?;
        let ticker: BinanceTicker = response.json().await?;
        let ticker = ticker.into_market_ticker()?;
        debug!("Binance ticker: {} = ${}", ticker.symbol, ticker.price);
        Ok(ticker)
    }
}

/// Leading `max_chars` characters of `text`, never splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Convert raw kline rows into candles.
///
/// Row layout: `[openTimeMs, "open", "high", "low", "close", "volume", ...]`.
fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Candle>> {
    rows.iter().map(|row| parse_kline(row)).collect()
}

fn parse_kline(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(AppError::ExternalApi(format!(
            "Malformed kline: expected at least 6 fields, got {}",
            row.len()
        )));
    }

    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| AppError::ExternalApi("Malformed kline open time".to_string()))?;

    Ok(Candle {
        time: open_time_ms / 1000,
        open: decimal_field(&row[1], "open")?,
        high: decimal_field(&row[2], "high")?,
        low: decimal_field(&row[3], "low")?,
        close: decimal_field(&row[4], "close")?,
        volume: decimal_field(&row[5], "volume")?,
    })
}

/// Binance encodes decimals as strings; plain JSON numbers are accepted too.
fn decimal_field(value: &Value, field: &str) -> Result<f64> {
    match value {
        Value::String(s) => parse_decimal(s, field),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AppError::ExternalApi(format!("Invalid {}: {}", field, n))),
        other => Err(AppError::ExternalApi(format!("Invalid {}: {}", field, other))),
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<f64> {
    raw.parse()
        .map_err(|_| AppError::ExternalApi(format!("Invalid {}: {:?}", field, raw)))
}
