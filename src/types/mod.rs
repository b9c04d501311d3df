pub mod market;
pub mod signals;
pub mod snapshot;

pub use market::*;
pub use signals::*;
pub use snapshot::*;
