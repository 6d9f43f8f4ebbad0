pub mod control;
pub mod pool;
pub mod sequencing;

// Re-export commonly used types
pub use control::{ReleaseControl, ReleasePolicy};
pub use pool::{OrderPool, PooledOrder};
pub use sequencing::SequencingRule;
