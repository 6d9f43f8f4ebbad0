use super::types::{OrderId, PeriodIndex, ProductType, SimTime, StationId};

/// Attributes drawn by the order generator for a new order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAttributes {
    pub product_type: ProductType,
    pub due_date: SimTime,
}

/// Where an order is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Created,
    Pooled,
    Released,
    Waiting(StationId),
    Processing(StationId),
    Finished,
}

/// A single order and its progress along its route
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub product_type: ProductType,
    pub due_date: SimTime,
    /// Due date minus the expected flow time, set once at pool entry
    pub planned_release: Option<i64>,
    /// Release bucket derived from `planned_release`
    pub release_period: Option<PeriodIndex>,
    pub route: Vec<StationId>,
    /// Index of the routing step currently requested or processed
    pub position: usize,
    pub state: OrderState,
    pub created: SimTime,
    pub released: Option<SimTime>,
    pub finished: Option<SimTime>,
    /// Stations whose processing this order has completed, in order
    pub visited: Vec<StationId>,
}

impl Order {
    pub fn new(id: OrderId, attributes: OrderAttributes, route: Vec<StationId>, now: SimTime) -> Self {
        Self {
            id,
            product_type: attributes.product_type,
            due_date: attributes.due_date,
            planned_release: None,
            release_period: None,
            route,
            position: 0,
            state: OrderState::Created,
            created: now,
            released: None,
            finished: None,
            visited: Vec::new(),
        }
    }

    /// Station of the current routing step, `None` once past the end
    pub fn current_station(&self) -> Option<StationId> {
        self.route.get(self.position).copied()
    }

    pub fn is_last_step(&self) -> bool {
        self.position + 1 == self.route.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state == OrderState::Finished
    }

    /// Shop floor flow time, once finished
    pub fn flow_time(&self) -> Option<SimTime> {
        match (self.released, self.finished) {
            (Some(released), Some(finished)) => Some(finished.saturating_sub(released)),
            _ => None,
        }
    }

    pub fn mark_released(&mut self, now: SimTime) {
        self.released = Some(now);
        self.state = OrderState::Released;
    }

    /// Record completion of the current step.
    ///
    /// Returns true when that step was the last one and the order is now finished.
    pub fn complete_step(&mut self, now: SimTime) -> bool {
        if let Some(station) = self.current_station() {
            self.visited.push(station);
        }
        if self.is_last_step() {
            self.position = self.route.len();
            self.finished = Some(now);
            self.state = OrderState::Finished;
            true
        } else {
            self.position += 1;
            false
        }
    }
}
