pub mod config;
pub mod core;
pub mod experiment;
pub mod release;
pub mod stats;

// Re-export commonly used types
pub use crate::config::{ConcurrencyMode, ExecutionConfig, ShopConfig};
pub use crate::core::error::{Result, ShopError};
pub use crate::core::simulation_builder::SimulationBuilder;
pub use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
pub use crate::core::types::{OrderId, PeriodIndex, ProductType, SimTime, StationId};
pub use crate::release::{ReleasePolicy, SequencingRule};
