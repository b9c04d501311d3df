use serde::{Deserialize, Serialize};

/// Reasoning line emitted when the candle window is too short to analyse.
pub const INSUFFICIENT_DATA_REASON: &str = "Insufficient data for analysis";

/// Reasoning line shown before the first evaluation completes.
pub const INITIALIZING_REASON: &str = "Initializing analysis...";

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdValues {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger band levels. `lower <= middle <= upper` for any finite window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Indicator snapshot for one evaluation. Computed fresh every time, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBundle {
    /// RSI(14), in [0, 100].
    pub rsi: f64,
    pub macd: MacdValues,
    pub sma20: f64,
    pub sma50: f64,
    pub bollinger: BollingerBands,
}

/// Trade recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl TradeSignal {
    /// Get display label for this signal.
    pub fn label(&self) -> &'static str {
        match self {
            TradeSignal::Buy => "BUY",
            TradeSignal::Sell => "SELL",
            TradeSignal::Hold => "HOLD",
        }
    }

    /// Whether a trade should be placed at all.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, TradeSignal::Hold)
    }
}

impl std::fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of the signal fusion engine.
///
/// `target_price` and `stop_loss` are either both set (BUY/SELL) or both absent (HOLD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub signal: TradeSignal,
    /// Percentage in [0, 95].
    pub confidence: u8,
    /// One line per triggered rule, in rule order.
    pub reasoning: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
}

impl PredictionResult {
    /// A non-actionable result with a single explanation.
    pub fn hold(reason: &str) -> Self {
        Self {
            signal: TradeSignal::Hold,
            confidence: 0,
            reasoning: vec![reason.to_string()],
            target_price: None,
            stop_loss: None,
        }
    }

    /// Result returned when fewer than 50 candles are available.
    pub fn insufficient_data() -> Self {
        Self::hold(INSUFFICIENT_DATA_REASON)
    }

    /// Placeholder shown until the first evaluation lands.
    pub fn initializing() -> Self {
        Self::hold(INITIALIZING_REASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_signal_serialization() {
        assert_eq!(serde_json::to_string(&TradeSignal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&TradeSignal::Sell).unwrap(), "\"SELL\"");
        assert_eq!(serde_json::to_string(&TradeSignal::Hold).unwrap(), "\"HOLD\"");

        let parsed: TradeSignal = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, TradeSignal::Sell);
    }

    #[test]
    fn test_trade_signal_actionable() {
        assert!(TradeSignal::Buy.is_actionable());
        assert!(TradeSignal::Sell.is_actionable());
        assert!(!TradeSignal::Hold.is_actionable());
    }

    #[test]
    fn test_trade_signal_display() {
        assert_eq!(format!("{}", TradeSignal::Hold), "HOLD");
    }

    #[test]
    fn test_insufficient_data_result() {
        let result = PredictionResult::insufficient_data();
        assert_eq!(result.signal, TradeSignal::Hold);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.reasoning, vec![INSUFFICIENT_DATA_REASON.to_string()]);
        assert!(result.target_price.is_none());
        assert!(result.stop_loss.is_none());
    }

    #[test]
    fn test_hold_omits_price_levels_in_json() {
        let json = serde_json::to_string(&PredictionResult::initializing()).unwrap();
        assert!(json.contains("\"signal\":\"HOLD\""));
        assert!(!json.contains("targetPrice"));
        assert!(!json.contains("stopLoss"));
    }

    #[test]
    fn test_actionable_result_serializes_camel_case() {
        let result = PredictionResult {
            signal: TradeSignal::Buy,
            confidence: 83,
            reasoning: vec!["MACD showing bullish momentum".to_string()],
            target_price: Some(103.0),
            stop_loss: Some(98.0),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"targetPrice\":103.0"));
        assert!(json.contains("\"stopLoss\":98.0"));
        assert!(json.contains("\"confidence\":83"));
    }

    #[test]
    fn test_indicator_bundle_serialization() {
        let bundle = IndicatorBundle {
            rsi: 55.0,
            macd: MacdValues {
                macd: 1.0,
                signal: 0.9,
                histogram: 0.1,
            },
            sma20: 101.0,
            sma50: 99.0,
            bollinger: BollingerBands {
                upper: 105.0,
                middle: 101.0,
                lower: 97.0,
            },
        };
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"sma20\":101.0"));
        assert!(json.contains("\"bollinger\":{\"upper\":105.0"));
    }
}
