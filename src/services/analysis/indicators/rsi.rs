//! Relative Strength Index (RSI).

use super::sma::calculate_sma;
use crate::services::analysis::Reading;

/// Default RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// RSI over the last `period` price changes.
///
/// RSI = 100 - 100 / (1 + RS), RS = average gain / average loss, both averaged
/// with a plain SMA over the trailing window (no Wilder smoothing).
///
/// - Fewer than `period + 1` prices: `InsufficientData` (legacy sentinel `50`).
/// - Average loss of zero: `100`, even when the average gain is zero too.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Reading<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Reading::InsufficientData;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|pair| {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip();

    let avg_gain = calculate_sma(&gains, period).or_sentinel(0.0);
    let avg_loss = calculate_sma(&losses, period).or_sentinel(0.0);

    if avg_loss == 0.0 {
        return Reading::Computed(100.0);
    }

    let rs = avg_gain / avg_loss;
    Reading::Computed(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI with the default period (14).
pub fn calculate_rsi_default(closes: &[f64]) -> Reading<f64> {
    calculate_rsi(closes, RSI_PERIOD)
}
