//! Simple Moving Average (SMA).

use crate::services::analysis::Reading;

/// Average of the last `period` values.
///
/// Fewer than `period` values (or a zero period) is `InsufficientData`. The legacy
/// sentinel for that case is `0`, which callers cannot tell apart from a real
/// average of zero.
pub fn calculate_sma(values: &[f64], period: usize) -> Reading<f64> {
    if period == 0 || values.len() < period {
        return Reading::InsufficientData;
    }

    let sum: f64 = values[values.len() - period..].iter().sum();
    Reading::Computed(sum / period as f64)
}
