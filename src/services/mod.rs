pub mod analysis;
pub mod poller;
pub mod snapshot_store;

pub use analysis::{Evaluation, PredictionEngine};
pub use poller::{Poller, RefreshOutcome};
pub use snapshot_store::SnapshotStore;
