use serde::{Deserialize, Serialize};

/// One OHLCV sample.
///
/// Candles arrive oldest-first from the data source. The `low <= open, close <= high`
/// relationship is expected but never checked; analysis treats every field as a
/// plain number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in seconds since the Unix epoch.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Create a candle.
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Extract closing prices from a candle window.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract traded volumes from a candle window.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// 24-hour ticker summary. Display only, never fed into the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTicker {
    pub symbol: String,
    pub price: f64,
    /// 24h price change in percent.
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    /// 24h traded volume in base asset units.
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    /// Not provided by the ticker endpoint; always 0.
    pub market_cap: f64,
}

/// Kline interval accepted by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KlineInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    #[default]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl KlineInterval {
    /// Parse the exchange notation ("1m", "5m", ...).
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(KlineInterval::OneMinute),
            "5m" => Some(KlineInterval::FiveMinutes),
            "15m" => Some(KlineInterval::FifteenMinutes),
            "1h" => Some(KlineInterval::OneHour),
            "4h" => Some(KlineInterval::FourHours),
            "1d" => Some(KlineInterval::OneDay),
            _ => None,
        }
    }

    /// Exchange notation for query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::OneHour => "1h",
            KlineInterval::FourHours => "4h",
            KlineInterval::OneDay => "1d",
        }
    }

    /// Candle length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            KlineInterval::OneMinute => 60,
            KlineInterval::FiveMinutes => 300,
            KlineInterval::FifteenMinutes => 900,
            KlineInterval::OneHour => 3600,
            KlineInterval::FourHours => 14400,
            KlineInterval::OneDay => 86400,
        }
    }
}

impl std::fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
