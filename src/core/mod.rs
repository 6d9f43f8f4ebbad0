pub mod error;
pub mod event;
pub mod event_scheduler;
pub mod generators;
pub mod order;
pub mod routing;
pub mod simulation_builder;
pub mod simulation_engine;
pub mod station;
pub mod types;
