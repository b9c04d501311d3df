//! Exponential Moving Average (EMA).

use crate::services::analysis::Reading;

/// EMA over the whole series.
///
/// Seeded from the first value rather than from an SMA of the first `period`
/// values, then smoothed forward with `alpha = 2 / (period + 1)`. An empty series
/// (or a zero period) is `InsufficientData`, legacy sentinel `0`.
pub fn calculate_ema(values: &[f64], period: usize) -> Reading<f64> {
    let Some((&first, rest)) = values.split_first() else {
        return Reading::InsufficientData;
    };
    if period == 0 {
        return Reading::InsufficientData;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let ema = rest
        .iter()
        .fold(first, |ema, &price| (price - ema) * multiplier + ema);

    Reading::Computed(ema)
}
