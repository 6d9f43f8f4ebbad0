//! Random variate sources the engine draws from.
//!
//! The engine only sees the two traits; the rand-backed implementations are
//! the defaults a [`SimulationBuilder`](super::simulation_builder::SimulationBuilder)
//! installs from a [`ShopConfig`](crate::config::ShopConfig).

use super::error::{Result, ShopError};
use super::order::OrderAttributes;
use super::types::{ProductType, SimTime, StationId};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use std::collections::VecDeque;

/// Supplies processing durations, expected to be non-negative
pub trait ProcessingTimeSource {
    fn sample(&mut self, station: StationId) -> f64;
}

/// Supplies attributes for the order created on a generation tick
pub trait OrderAttributeSource {
    /// `None` means no order is created on this tick
    fn next_order(&mut self, now: SimTime) -> Option<OrderAttributes>;
}

/// Convert a sampled duration to the integer time grain.
///
/// Negative (and non-finite) samples become zero.
pub fn to_duration(raw: f64) -> SimTime {
    if raw.is_nan() || raw < 0.0 {
        warn!("[Generator] Clamping invalid processing time {} to 0", raw);
        return 0;
    }
    // `as` saturates, so an infinite sample becomes SimTime::MAX
    raw.round() as SimTime
}

/// Exponentially distributed processing times, rounded to whole time units
#[derive(Debug, Clone)]
pub struct ExponentialProcessingTime {
    distribution: Exp<f64>,
    rng: StdRng,
}

impl ExponentialProcessingTime {
    pub fn new(mean: f64, seed: u64) -> Result<Self> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(ShopError::InvalidConfig(format!(
                "mean processing time must be positive, got {}",
                mean
            )));
        }
        let distribution = Exp::new(1.0 / mean)
            .map_err(|e| ShopError::InvalidConfig(format!("exponential distribution: {:?}", e)))?;
        Ok(Self {
            distribution,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl ProcessingTimeSource for ExponentialProcessingTime {
    fn sample(&mut self, _station: StationId) -> f64 {
        self.distribution.sample(&mut self.rng).round()
    }
}

/// Zero-variance processing time
#[derive(Debug, Clone, Copy)]
pub struct FixedProcessingTime(pub f64);

impl ProcessingTimeSource for FixedProcessingTime {
    fn sample(&mut self, _station: StationId) -> f64 {
        self.0
    }
}

/// Uniform product type, due date a whole number of periods ahead
#[derive(Debug, Clone)]
pub struct UniformOrderGenerator {
    product_types: Vec<ProductType>,
    period_length: SimTime,
    min_periods: u64,
    max_periods: u64,
    rng: StdRng,
}

impl UniformOrderGenerator {
    pub fn new(
        product_types: Vec<ProductType>,
        period_length: SimTime,
        min_periods: u64,
        max_periods: u64,
        seed: u64,
    ) -> Result<Self> {
        if product_types.is_empty() {
            return Err(ShopError::InvalidConfig(
                "order generator needs at least one product type".to_string(),
            ));
        }
        if min_periods > max_periods {
            return Err(ShopError::InvalidConfig(format!(
                "due date window {}..={} is inverted",
                min_periods, max_periods
            )));
        }
        Ok(Self {
            product_types,
            period_length,
            min_periods,
            max_periods,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl OrderAttributeSource for UniformOrderGenerator {
    fn next_order(&mut self, now: SimTime) -> Option<OrderAttributes> {
        let index = self.rng.gen_range(0..self.product_types.len());
        let periods = self.rng.gen_range(self.min_periods..=self.max_periods);
        Some(OrderAttributes {
            product_type: self.product_types[index],
            due_date: now + periods * self.period_length,
        })
    }
}

/// Replays a fixed order list, one order per generation tick
#[derive(Debug, Clone, Default)]
pub struct ScriptedOrders {
    pending: VecDeque<Option<OrderAttributes>>,
}

impl ScriptedOrders {
    pub fn new(orders: impl IntoIterator<Item = OrderAttributes>) -> Self {
        Self {
            pending: orders.into_iter().map(Some).collect(),
        }
    }

    /// Leave `ticks` generation ticks empty before the next scripted order
    pub fn then_idle(mut self, ticks: usize) -> Self {
        self.pending.extend(std::iter::repeat(None).take(ticks));
        self
    }

    pub fn then_order(mut self, attributes: OrderAttributes) -> Self {
        self.pending.push_back(Some(attributes));
        self
    }
}

impl OrderAttributeSource for ScriptedOrders {
    fn next_order(&mut self, _now: SimTime) -> Option<OrderAttributes> {
        self.pending.pop_front().flatten()
    }
}
