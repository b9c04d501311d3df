//! MACD (Moving Average Convergence Divergence).

use super::ema::calculate_ema;
use crate::services::analysis::Reading;
use crate::types::MacdValues;

pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;

/// Signal line as a fraction of the MACD line.
///
/// This approximates the usual 9-period EMA of the MACD series; the histogram is
/// therefore always `0.1 * macd` and shares its sign.
pub const MACD_SIGNAL_FACTOR: f64 = 0.9;

/// MACD = EMA(12) - EMA(26), signal = MACD * 0.9, histogram = MACD - signal.
///
/// Only an empty series is `InsufficientData`; the EMAs seed from the first close
/// so any non-empty input yields a value.
pub fn calculate_macd(closes: &[f64]) -> Reading<MacdValues> {
    let fast = calculate_ema(closes, MACD_FAST_PERIOD);
    let slow = calculate_ema(closes, MACD_SLOW_PERIOD);

    match (fast, slow) {
        (Reading::Computed(fast), Reading::Computed(slow)) => {
            let macd = fast - slow;
            let signal = macd * MACD_SIGNAL_FACTOR;
            Reading::Computed(MacdValues {
                macd,
                signal,
                histogram: macd - signal,
            })
        }
        _ => Reading::InsufficientData,
    }
}
