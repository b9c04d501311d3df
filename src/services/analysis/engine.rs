//! Signal fusion engine.
//!
//! Turns a candle window into a BUY / SELL / HOLD recommendation by running a
//! fixed, ordered rule table over the indicator bundle. Each rule adds weight to
//! the bullish or bearish side and contributes one reasoning line.

use super::indicators::{calculate_sma, compute_bundle};
use crate::types::{
    closes, volumes, BollingerBands, Candle, IndicatorBundle, MacdValues, PredictionResult,
    TradeSignal,
};
use tracing::debug;

/// Minimum window length; shorter windows return the insufficient-data HOLD.
pub const MIN_CANDLES: usize = 50;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Volume average window for the high-volume annotation.
pub const VOLUME_PERIOD: usize = 20;
pub const HIGH_VOLUME_MULTIPLIER: f64 = 1.5;

/// Confidence normalisation constant. Must stay in step with the rule weights.
/// The weights below sum to 5 for any single evaluation, so confidence tops out
/// at 83 and the cap is never reached.
pub const MAX_SCORE: u32 = 6;
pub const CONFIDENCE_CAP: u8 = 95;

/// A BUY or SELL needs strictly more than this confidence.
pub const ACTION_THRESHOLD: u8 = 60;

const RSI_WEIGHT: u32 = 2;
const MACD_WEIGHT: u32 = 1;
const TREND_WEIGHT: u32 = 1;
const BANDS_WEIGHT: u32 = 1;

const BUY_TARGET: f64 = 1.03;
const BUY_STOP: f64 = 0.98;
const SELL_TARGET: f64 = 0.97;
const SELL_STOP: f64 = 1.02;

/// Which side a rule supports, and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Bullish(u32),
    Bearish(u32),
    /// Reported in the reasoning, no effect on the score.
    Informational,
}

#[derive(Debug, Clone, PartialEq)]
struct RuleHit {
    vote: Vote,
    reason: String,
}

impl RuleHit {
    fn new(vote: Vote, reason: impl Into<String>) -> Self {
        Self {
            vote,
            reason: reason.into(),
        }
    }
}

/// Full outcome of one evaluation, including the intermediate values.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub prediction: PredictionResult,
    /// `None` when the window was shorter than [`MIN_CANDLES`].
    pub indicators: Option<IndicatorBundle>,
    pub bullish: u32,
    pub bearish: u32,
}

/// Stateless prediction engine.
pub struct PredictionEngine;

impl PredictionEngine {
    /// Evaluate a candle window (oldest first).
    pub fn evaluate(candles: &[Candle]) -> PredictionResult {
        Self::evaluate_detailed(candles).prediction
    }

    /// Indicator bundle for a candle window, `None` below [`MIN_CANDLES`].
    pub fn indicators(candles: &[Candle]) -> Option<IndicatorBundle> {
        if candles.len() < MIN_CANDLES {
            return None;
        }
        Some(compute_bundle(&closes(candles)))
    }

    /// Evaluate and return the bundle and side tallies alongside the prediction.
    pub fn evaluate_detailed(candles: &[Candle]) -> Evaluation {
        if candles.len() < MIN_CANDLES {
            debug!(
                "Skipping analysis: {} candles, need {}",
                candles.len(),
                MIN_CANDLES
            );
            return Evaluation {
                prediction: PredictionResult::insufficient_data(),
                indicators: None,
                bullish: 0,
                bearish: 0,
            };
        }

        let closes = closes(candles);
        let volumes = volumes(candles);
        let bundle = compute_bundle(&closes);
        let close = closes[closes.len() - 1];

        let hits = [
            analyze_rsi(bundle.rsi),
            analyze_macd(&bundle.macd),
            analyze_trend(close, bundle.sma20, bundle.sma50),
            analyze_bands(close, &bundle.bollinger),
            analyze_volume(&volumes),
        ];

        let mut bullish = 0;
        let mut bearish = 0;
        let mut reasoning = Vec::new();

        for hit in hits.into_iter().flatten() {
            match hit.vote {
                Vote::Bullish(weight) => bullish += weight,
                Vote::Bearish(weight) => bearish += weight,
                Vote::Informational => {}
            }
            reasoning.push(hit.reason);
        }

        let (signal, confidence) = decide(bullish, bearish);
        let (target_price, stop_loss) = match price_levels(signal, close) {
            Some((target, stop)) => (Some(target), Some(stop)),
            None => (None, None),
        };

        debug!(
            "Prediction: {} ({}% confidence, bullish={}, bearish={}, close={:.2}, rsi={:.1})",
            signal, confidence, bullish, bearish, close, bundle.rsi
        );

        Evaluation {
            prediction: PredictionResult {
                signal,
                confidence,
                reasoning,
                target_price,
                stop_loss,
            },
            indicators: Some(bundle),
            bullish,
            bearish,
        }
    }
}

/// Rule 1 / 1b: RSI extremes.
fn analyze_rsi(rsi: f64) -> Option<RuleHit> {
    if rsi < RSI_OVERSOLD {
        Some(RuleHit::new(
            Vote::Bullish(RSI_WEIGHT),
            format!("RSI oversold ({:.1}) - potential buy signal", rsi),
        ))
    } else if rsi > RSI_OVERBOUGHT {
        Some(RuleHit::new(
            Vote::Bearish(RSI_WEIGHT),
            format!("RSI overbought ({:.1}) - potential sell signal", rsi),
        ))
    } else {
        None
    }
}

/// Rule 2 / 2b: MACD momentum.
fn analyze_macd(macd: &MacdValues) -> Option<RuleHit> {
    if macd.macd > macd.signal && macd.histogram > 0.0 {
        Some(RuleHit::new(
            Vote::Bullish(MACD_WEIGHT),
            "MACD showing bullish momentum",
        ))
    } else if macd.macd < macd.signal && macd.histogram < 0.0 {
        Some(RuleHit::new(
            Vote::Bearish(MACD_WEIGHT),
            "MACD showing bearish momentum",
        ))
    } else {
        None
    }
}

/// Rule 3 / 3b: price stacked against both moving averages.
fn analyze_trend(close: f64, sma20: f64, sma50: f64) -> Option<RuleHit> {
    if close > sma20 && sma20 > sma50 {
        Some(RuleHit::new(
            Vote::Bullish(TREND_WEIGHT),
            "Price above moving averages - uptrend confirmed",
        ))
    } else if close < sma20 && sma20 < sma50 {
        Some(RuleHit::new(
            Vote::Bearish(TREND_WEIGHT),
            "Price below moving averages - downtrend confirmed",
        ))
    } else {
        None
    }
}

/// Rule 4 / 4b: close outside the Bollinger bands.
fn analyze_bands(close: f64, bands: &BollingerBands) -> Option<RuleHit> {
    if close < bands.lower {
        Some(RuleHit::new(
            Vote::Bullish(BANDS_WEIGHT),
            "Price near Bollinger lower band - potential reversal",
        ))
    } else if close > bands.upper {
        Some(RuleHit::new(
            Vote::Bearish(BANDS_WEIGHT),
            "Price near Bollinger upper band - potential pullback",
        ))
    } else {
        None
    }
}

/// Rule 5: volume spike annotation.
fn analyze_volume(volumes: &[f64]) -> Option<RuleHit> {
    let current = *volumes.last()?;
    let average = calculate_sma(volumes, VOLUME_PERIOD).or_sentinel(0.0);

    if current > average * HIGH_VOLUME_MULTIPLIER {
        Some(RuleHit::new(
            Vote::Informational,
            "High volume confirms price movement",
        ))
    } else {
        None
    }
}

/// Map side tallies to a signal and a confidence percentage.
fn decide(bullish: u32, bearish: u32) -> (TradeSignal, u8) {
    let total = bullish + bearish;
    let raw = (total as f64 / MAX_SCORE as f64 * 100.0).round();
    let confidence = raw.min(CONFIDENCE_CAP as f64) as u8;

    let signal = if bullish > bearish && confidence > ACTION_THRESHOLD {
        TradeSignal::Buy
    } else if bearish > bullish && confidence > ACTION_THRESHOLD {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    };

    (signal, confidence)
}

/// Target price and stop loss for an actionable signal.
fn price_levels(signal: TradeSignal, close: f64) -> Option<(f64, f64)> {
    match signal {
        TradeSignal::Buy => Some((close * BUY_TARGET, close * BUY_STOP)),
        TradeSignal::Sell => Some((close * SELL_TARGET, close * SELL_STOP)),
        TradeSignal::Hold => None,
    }
}
