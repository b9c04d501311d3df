//! Technical analysis core.
//!
//! Pure, synchronous computation: candle window in, `PredictionResult` out.
//! Nothing here performs I/O or keeps state between calls, so it can be invoked
//! from any number of tasks at once.

pub mod engine;
pub mod indicators;

pub use engine::{Evaluation, PredictionEngine, MIN_CANDLES};
pub use indicators::compute_bundle;

/// Outcome of an indicator calculation.
///
/// Short or empty inputs produce `InsufficientData` instead of a number. Callers
/// that need the legacy behaviour collapse it with [`Reading::or_sentinel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Computed(T),
    InsufficientData,
}

impl<T> Reading<T> {
    /// The computed value, or `sentinel` when there was not enough data.
    pub fn or_sentinel(self, sentinel: T) -> T {
        match self {
            Reading::Computed(value) => value,
            Reading::InsufficientData => sentinel,
        }
    }

    /// Convert into an `Option`, dropping the insufficiency marker.
    pub fn computed(self) -> Option<T> {
        match self {
            Reading::Computed(value) => Some(value),
            Reading::InsufficientData => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Reading::Computed(_))
    }

    /// Transform a computed value, passing `InsufficientData` through.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reading<U> {
        match self {
            Reading::Computed(value) => Reading::Computed(f(value)),
            Reading::InsufficientData => Reading::InsufficientData,
        }
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Computed(v),
            None => Reading::InsufficientData,
        }
    }
}
