use crate::core::error::{Result, ShopError};
use crate::core::routing::RoutingTable;
use crate::core::types::SimTime;
use crate::release::{ReleasePolicy, SequencingRule};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive range of whole periods between creation and due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateWindow {
    pub min: u64,
    pub max: u64,
}

impl Default for DueDateWindow {
    fn default() -> Self {
        Self { min: 2, max: 15 }
    }
}

/// Parameters of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub period_length: SimTime,
    /// Fixed interval between order-generation ticks
    pub new_order_time: SimTime,
    /// Horizon; events at or after this time never run
    pub sim_time: SimTime,
    pub first_order_time: SimTime,
    pub routing: RoutingTable,
    pub release_policy: ReleasePolicy,
    pub sequencing_rule: SequencingRule,
    /// Mean station processing time; also the per-station expectation in the PRD
    pub mean_processing_time: f64,
    pub due_date_periods: DueDateWindow,
    pub random_seed: u64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            period_length: 1440,
            new_order_time: 80,
            sim_time: 1_000_000,
            first_order_time: 0,
            routing: RoutingTable::default(),
            release_policy: ReleasePolicy::Immediate,
            sequencing_rule: SequencingRule::EarliestDueDate,
            mean_processing_time: 100.0,
            due_date_periods: DueDateWindow::default(),
            random_seed: 42,
        }
    }
}

impl ShopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_period_length(mut self, period_length: SimTime) -> Self {
        self.period_length = period_length;
        self
    }

    pub fn with_new_order_time(mut self, interval: SimTime) -> Self {
        self.new_order_time = interval;
        self
    }

    pub fn with_sim_time(mut self, horizon: SimTime) -> Self {
        self.sim_time = horizon;
        self
    }

    pub fn with_first_order_time(mut self, time: SimTime) -> Self {
        self.first_order_time = time;
        self
    }

    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    pub fn with_sequencing_rule(mut self, rule: SequencingRule) -> Self {
        self.sequencing_rule = rule;
        self
    }

    pub fn with_mean_processing_time(mut self, mean: f64) -> Self {
        self.mean_processing_time = mean;
        self
    }

    pub fn with_due_date_periods(mut self, min: u64, max: u64) -> Self {
        self.due_date_periods = DueDateWindow { min, max };
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Scenario label such as `BIL_EDD`
    pub fn scenario_label(&self) -> String {
        format!("{}_{}", self.release_policy.label(), self.sequencing_rule.label())
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_length == 0 {
            return Err(ShopError::InvalidConfig("period_length must be greater than 0".to_string()));
        }

        if self.new_order_time == 0 {
            return Err(ShopError::InvalidConfig("new_order_time must be greater than 0".to_string()));
        }

        if self.sim_time == 0 {
            return Err(ShopError::InvalidConfig("sim_time must be greater than 0".to_string()));
        }

        if !self.mean_processing_time.is_finite() || self.mean_processing_time <= 0.0 {
            return Err(ShopError::InvalidConfig(
                "mean_processing_time must be a positive number".to_string(),
            ));
        }

        if self.due_date_periods.min > self.due_date_periods.max {
            return Err(ShopError::InvalidConfig(
                "due_date_periods.min cannot be greater than due_date_periods.max".to_string(),
            ));
        }

        self.routing.validate()
    }
}

/// Enumeration of supported concurrency modes for a scenario grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Scenarios run one after another on the calling thread
    Sequential,
    /// Scenarios run side by side on a rayon pool
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// How a set of independent runs is executed
///
/// Each run is single-threaded; concurrency only applies across runs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    pub concurrency_mode: ConcurrencyMode,
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShopConfig::default();
        assert_eq!(config.period_length, 1440);
        assert_eq!(config.new_order_time, 80);
        assert_eq!(config.sim_time, 1_000_000);
        assert_eq!(config.release_policy, ReleasePolicy::Immediate);
        assert_eq!(config.sequencing_rule, SequencingRule::EarliestDueDate);
        assert_eq!(config.due_date_periods, DueDateWindow { min: 2, max: 15 });
        assert!(config.validate().is_ok());
        assert_eq!(config.scenario_label(), "IR_EDD");
    }

    #[test]
    fn test_builder_pattern() {
        let config = ShopConfig::new()
            .with_period_length(100)
            .with_new_order_time(10)
            .with_sim_time(5000)
            .with_release_policy(ReleasePolicy::Bucketed)
            .with_sequencing_rule(SequencingRule::EarliestPlannedRelease)
            .with_due_date_periods(1, 3)
            .with_random_seed(7);

        assert_eq!(config.period_length, 100);
        assert_eq!(config.new_order_time, 10);
        assert_eq!(config.sim_time, 5000);
        assert_eq!(config.due_date_periods.max, 3);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.scenario_label(), "BIL_PRD");
    }

    #[test]
    fn test_validation() {
        let mut config = ShopConfig::default();
        config.period_length = 0;
        assert!(config.validate().is_err());

        config = ShopConfig::default().with_new_order_time(0);
        assert!(config.validate().is_err());

        config = ShopConfig::default().with_mean_processing_time(-1.0);
        assert!(config.validate().is_err());

        config = ShopConfig::default().with_due_date_periods(5, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ShopConfig::from_json_str(
            r#"{"period_length": 100, "release_policy": "BIL", "sequencing_rule": "PRD",
                "routing": {"1": [1, 2], "2": [2]}}"#,
        )
        .unwrap();
        assert_eq!(config.period_length, 100);
        assert_eq!(config.new_order_time, 80);
        assert_eq!(config.release_policy, ReleasePolicy::Bucketed);
        assert_eq!(config.routing.route(2).unwrap(), &[2]);
    }

    #[test]
    fn test_json_with_empty_route_is_rejected() {
        let err = ShopConfig::from_json_str(r#"{"routing": {"1": []}}"#).unwrap_err();
        assert!(matches!(err, ShopError::EmptyRoute(1)));
    }

    #[test]
    fn test_execution_config_builder() {
        let exec = ExecutionConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);
        assert_eq!(exec.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(exec.thread_pool_size, Some(4));
        assert_eq!(ExecutionConfig::default().concurrency_mode, ConcurrencyMode::Sequential);
    }
}
