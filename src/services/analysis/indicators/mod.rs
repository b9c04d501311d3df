//! Technical indicator implementations.
//!
//! Every function takes a slice of prices (or volumes), oldest first, and
//! returns a [`Reading`]. None of them fail or panic on short input.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{calculate_bollinger, calculate_bollinger_default};
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::{calculate_rsi, calculate_rsi_default};
pub use sma::calculate_sma;

use super::Reading;
use crate::types::{BollingerBands, IndicatorBundle, MacdValues};

/// Short trend average.
pub const SMA_SHORT_PERIOD: usize = 20;

/// Long trend average.
pub const SMA_LONG_PERIOD: usize = 50;

/// Sentinel used for an average that could not be computed.
pub const SMA_SENTINEL: f64 = 0.0;

/// Sentinel used for an RSI that could not be computed.
pub const RSI_SENTINEL: f64 = 50.0;

/// Compute the full indicator set for a close series.
///
/// Insufficient readings collapse to their sentinels (`0` for averages and
/// bands, `50` for RSI) so the fusion rules see plain numbers.
pub fn compute_bundle(closes: &[f64]) -> IndicatorBundle {
    IndicatorBundle {
        rsi: calculate_rsi_default(closes).or_sentinel(RSI_SENTINEL),
        macd: calculate_macd(closes).or_sentinel(MacdValues::default()),
        sma20: calculate_sma(closes, SMA_SHORT_PERIOD).or_sentinel(SMA_SENTINEL),
        sma50: calculate_sma(closes, SMA_LONG_PERIOD).or_sentinel(SMA_SENTINEL),
        bollinger: calculate_bollinger_default(closes).or_sentinel(BollingerBands::default()),
    }
}

/// Like [`compute_bundle`], but `InsufficientData` if any indicator lacked data.
pub fn try_compute_bundle(closes: &[f64]) -> Reading<IndicatorBundle> {
    let rsi = calculate_rsi_default(closes);
    let macd = calculate_macd(closes);
    let sma20 = calculate_sma(closes, SMA_SHORT_PERIOD);
    let sma50 = calculate_sma(closes, SMA_LONG_PERIOD);
    let bollinger = calculate_bollinger_default(closes);

    match (rsi, macd, sma20, sma50, bollinger) {
        (
            Reading::Computed(rsi),
            Reading::Computed(macd),
            Reading::Computed(sma20),
            Reading::Computed(sma50),
            Reading::Computed(bollinger),
        ) => Reading::Computed(IndicatorBundle {
            rsi,
            macd,
            sma20,
            sma50,
            bollinger,
        }),
        _ => Reading::InsufficientData,
    }
}
