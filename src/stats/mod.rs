//! Observability of a run: per-order tracking, creation-time features and
//! due-date performance.
//!
//! The tracker only records; nothing in the engine reads it back to make a
//! control decision.

pub mod export;
pub mod history;
pub mod tracker;

// Re-export commonly used types
pub use export::{write_csv, write_csv_file, ExportRow};
pub use history::{FlowTimeHistory, HISTORY_CAPACITY};
pub use tracker::{FeatureRecord, PerformanceSummary, StatisticsTracker, TrackingRecord};
