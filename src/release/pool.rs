use crate::core::types::{OrderId, PeriodIndex, SimTime};
use std::collections::BTreeMap;

/// What the pool needs to know about a waiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PooledOrder {
    pub order_id: OrderId,
    pub due_date: SimTime,
    pub planned_release: i64,
}

/// Orders not yet released, bucketed by release period
#[derive(Debug, Clone, Default)]
pub struct OrderPool {
    buckets: BTreeMap<PeriodIndex, Vec<PooledOrder>>,
    len: usize,
}

impl OrderPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: PeriodIndex, order: PooledOrder) {
        self.buckets.entry(period).or_default().push(order);
        self.len += 1;
    }

    /// Remove and return every order whose bucket is at or before `period`.
    ///
    /// Buckets come out in ascending period order, orders within a bucket in
    /// insertion order. Emptied buckets are dropped; asking for a period with
    /// no bucket releases nothing.
    pub fn take_due(&mut self, period: PeriodIndex) -> Vec<PooledOrder> {
        let not_due = match period.checked_add(1) {
            Some(next) => self.buckets.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.buckets, not_due);

        let released: Vec<PooledOrder> = due.into_values().flatten().collect();
        self.len -= released.len();
        released
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.buckets
            .values()
            .flatten()
            .any(|order| order.order_id == order_id)
    }

    /// Periods that currently hold at least one order
    pub fn periods(&self) -> impl Iterator<Item = PeriodIndex> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
