//! BTC Pulse - rule-based technical analysis for crypto price charts

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use config::{Config, PollingConfig};
pub use error::{AppError, Result};
pub use services::analysis::{compute_bundle, Reading, MIN_CANDLES};
pub use services::{Poller, PredictionEngine, RefreshOutcome, SnapshotStore};
pub use types::*;
