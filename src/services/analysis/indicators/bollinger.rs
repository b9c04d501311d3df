//! Bollinger Bands.

use super::sma::calculate_sma;
use crate::services::analysis::Reading;
use crate::types::BollingerBands;

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Population standard deviation of `values` around `mean`.
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Bollinger Bands over the trailing `period` closes.
///
/// - Middle band: SMA(period)
/// - Upper/lower band: middle +/- `width` * population standard deviation
///
/// Fewer than `period` closes is `InsufficientData`.
pub fn calculate_bollinger(closes: &[f64], period: usize, width: f64) -> Reading<BollingerBands> {
    let Reading::Computed(middle) = calculate_sma(closes, period) else {
        return Reading::InsufficientData;
    };

    let window = &closes[closes.len() - period..];
    let deviation = std_dev(window, middle);

    Reading::Computed(BollingerBands {
        upper: middle + width * deviation,
        middle,
        lower: middle - width * deviation,
    })
}

/// Bollinger Bands with default parameters (20 SMA, 2 standard deviations).
pub fn calculate_bollinger_default(closes: &[f64]) -> Reading<BollingerBands> {
    calculate_bollinger(closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH)
}
