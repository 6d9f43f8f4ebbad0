use super::pool::{OrderPool, PooledOrder};
use super::sequencing::SequencingRule;
use crate::core::order::{Order, OrderState};
use crate::core::types::{PeriodIndex, SimTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// When pooled orders enter the shop floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleasePolicy {
    /// Every order is released the instant it is generated
    #[serde(rename = "IR")]
    Immediate,
    /// Orders wait in period buckets keyed by their planned release date
    #[serde(rename = "BIL")]
    Bucketed,
}

impl ReleasePolicy {
    pub fn label(&self) -> &'static str {
        match self {
            ReleasePolicy::Immediate => "IR",
            ReleasePolicy::Bucketed => "BIL",
        }
    }
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        ReleasePolicy::Immediate
    }
}

/// Release control layer: owns the pool and the current release period
#[derive(Debug, Clone)]
pub struct ReleaseControl {
    policy: ReleasePolicy,
    rule: SequencingRule,
    period_length: SimTime,
    mean_processing_time: f64,
    pool: OrderPool,
    current_period: PeriodIndex,
    released_total: u64,
}

impl ReleaseControl {
    /// `period_length` must be non-zero; [`ShopConfig::validate`](crate::config::ShopConfig::validate)
    /// guarantees it for engines built from a config.
    pub fn new(
        policy: ReleasePolicy,
        rule: SequencingRule,
        period_length: SimTime,
        mean_processing_time: f64,
    ) -> Self {
        Self {
            policy,
            rule,
            period_length: period_length.max(1),
            mean_processing_time,
            pool: OrderPool::new(),
            current_period: 0,
            released_total: 0,
        }
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub fn rule(&self) -> SequencingRule {
        self.rule
    }

    pub fn pool(&self) -> &OrderPool {
        &self.pool
    }

    /// Index of the period the last trigger check placed the shop in
    pub fn current_period(&self) -> PeriodIndex {
        self.current_period
    }

    pub fn released_total(&self) -> u64 {
        self.released_total
    }

    /// Due date minus the expected flow time along a route of `route_len` stations
    pub fn planned_release_date(&self, route_len: usize, due_date: SimTime) -> i64 {
        let expected_flow_time = (route_len as f64 * self.mean_processing_time).round() as i64;
        (due_date as i64).saturating_sub(expected_flow_time)
    }

    /// Period a (possibly negative) point in time falls in
    pub fn period_of(&self, time: i64) -> PeriodIndex {
        time.div_euclid(self.period_length as i64)
    }

    /// Take a freshly created order.
    ///
    /// Its planned release date and bucket are fixed here, once. Under
    /// immediate release the order comes straight back for release; under
    /// bucketed release it stays pooled until its period is reached.
    pub fn admit(&mut self, order: &mut Order) -> Vec<PooledOrder> {
        let planned_release = self.planned_release_date(order.route.len(), order.due_date);
        let period = self.period_of(planned_release);
        order.planned_release = Some(planned_release);
        order.release_period = Some(period);

        let pooled = PooledOrder {
            order_id: order.id,
            due_date: order.due_date,
            planned_release,
        };

        match self.policy {
            ReleasePolicy::Immediate => {
                self.released_total += 1;
                vec![pooled]
            }
            ReleasePolicy::Bucketed => {
                order.state = OrderState::Pooled;
                self.pool.insert(period, pooled);
                debug!(
                    "[Release] Order {} pooled for period {} (prd {})",
                    order.id, period, planned_release
                );
                Vec::new()
            }
        }
    }

    /// Periodic trigger, checked on every generation tick.
    ///
    /// Fires once `now` reaches the start of the next period. Under bucketed
    /// release every bucket at or before the new current period is emptied in
    /// one go and the orders come back in sequencing-rule order.
    pub fn on_tick(&mut self, now: SimTime) -> Vec<PooledOrder> {
        let next_boundary = (self.current_period + 1).saturating_mul(self.period_length as i64);
        if (now as i64) < next_boundary {
            return Vec::new();
        }

        self.current_period = self.period_of(now as i64);

        match self.policy {
            ReleasePolicy::Immediate => Vec::new(),
            ReleasePolicy::Bucketed => {
                let mut released = self.pool.take_due(self.current_period);
                self.rule.sequence(&mut released);
                self.released_total += released.len() as u64;
                info!(
                    "[Release] Period {} at time {}: releasing {} orders ({} still pooled)",
                    self.current_period,
                    now,
                    released.len(),
                    self.pool.len()
                );
                released
            }
        }
    }
}
