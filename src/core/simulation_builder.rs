use super::error::Result;
use super::generators::{
    ExponentialProcessingTime, OrderAttributeSource, ProcessingTimeSource, UniformOrderGenerator,
};
use super::simulation_engine::{SimulationEngine, SimulationObserver};
use crate::config::ShopConfig;
use crate::release::ReleaseControl;

/// Keeps the processing-time stream independent of the order stream
const PROCESSING_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Builds a [`SimulationEngine`] from a validated [`ShopConfig`].
///
/// Without overrides the engine draws orders from [`UniformOrderGenerator`]
/// and processing times from [`ExponentialProcessingTime`], both seeded from
/// `random_seed`.
pub struct SimulationBuilder {
    config: ShopConfig,
    order_source: Option<Box<dyn OrderAttributeSource>>,
    processing_times: Option<Box<dyn ProcessingTimeSource>>,
    observers: Vec<Box<dyn SimulationObserver>>,
    retain_finished_orders: bool,
}

impl SimulationBuilder {
    pub fn new(config: ShopConfig) -> Self {
        Self {
            config,
            order_source: None,
            processing_times: None,
            observers: Vec::new(),
            retain_finished_orders: true,
        }
    }

    pub fn with_order_source(mut self, source: impl OrderAttributeSource + 'static) -> Self {
        self.order_source = Some(Box::new(source));
        self
    }

    pub fn with_processing_times(mut self, source: impl ProcessingTimeSource + 'static) -> Self {
        self.processing_times = Some(Box::new(source));
        self
    }

    pub fn with_observer(mut self, observer: impl SimulationObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Keep finished orders queryable through the engine (the default).
    ///
    /// Turning this off drops each order once it finishes; its tracking and
    /// feature records still reach the export rows.
    pub fn with_finished_order_retention(mut self, retain: bool) -> Self {
        self.retain_finished_orders = retain;
        self
    }

    pub fn build(self) -> Result<SimulationEngine> {
        let config = self.config;
        config.validate()?;

        let order_source: Box<dyn OrderAttributeSource> = match self.order_source {
            Some(source) => source,
            None => Box::new(UniformOrderGenerator::new(
                config.routing.product_types().collect(),
                config.period_length,
                config.due_date_periods.min,
                config.due_date_periods.max,
                config.random_seed,
            )?),
        };

        let processing_times: Box<dyn ProcessingTimeSource> = match self.processing_times {
            Some(source) => source,
            None => Box::new(ExponentialProcessingTime::new(
                config.mean_processing_time,
                config.random_seed ^ PROCESSING_SEED_SALT,
            )?),
        };

        let release = ReleaseControl::new(
            config.release_policy,
            config.sequencing_rule,
            config.period_length,
            config.mean_processing_time,
        );

        let mut engine = SimulationEngine::new(
            config.routing,
            release,
            processing_times,
            order_source,
            config.first_order_time,
            config.new_order_time,
            config.sim_time,
        );
        engine.set_finished_order_retention(self.retain_finished_orders);
        for observer in self.observers {
            engine.add_observer(observer);
        }
        Ok(engine)
    }
}
