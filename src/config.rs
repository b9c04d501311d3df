use crate::types::KlineInterval;
use std::env;
use std::time::Duration;

const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Market-data polling configuration.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Trading pairs to analyse (upper case, e.g. "BTCUSDT").
    pub symbols: Vec<String>,
    /// Candle interval requested from the exchange.
    pub interval: KlineInterval,
    /// Number of candles per window.
    pub candle_limit: u16,
    /// Seconds between refreshes.
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string()],
            interval: KlineInterval::FiveMinutes,
            candle_limit: 100,
            poll_interval_secs: 30,
        }
    }
}

impl PollingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Binance REST base URL.
    pub binance_api_url: String,
    /// Binance API key (optional, public endpoints work without).
    pub binance_api_key: Option<String>,
    /// HTTP request timeout for market data (seconds).
    pub request_timeout_secs: u64,
    /// Polling configuration.
    pub polling: PollingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = PollingConfig::default();

        // Format: "BTCUSDT,ETHUSDT"
        let symbols = env::var("SYMBOLS")
            .ok()
            .map(|s| parse_symbols(&s))
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or(defaults.symbols);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            binance_api_url: env::var("BINANCE_API_URL")
                .unwrap_or_else(|_| DEFAULT_BINANCE_API_URL.to_string()),
            binance_api_key: env::var("BINANCE_API_KEY").ok().filter(|k| !k.is_empty()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            polling: PollingConfig {
                symbols,
                interval: env::var("KLINE_INTERVAL")
                    .ok()
                    .and_then(|v| KlineInterval::from_str(&v))
                    .unwrap_or(defaults.interval),
                candle_limit: env::var("KLINE_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|limit| *limit > 0)
                    .unwrap_or(defaults.candle_limit),
                poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.poll_interval_secs),
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Split a comma-separated symbol list, trimming and upper-casing entries.
fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
