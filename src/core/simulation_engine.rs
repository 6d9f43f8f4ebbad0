use super::error::{Result, ShopError};
use super::event::ShopEvent;
use super::event_scheduler::EventScheduler;
use super::generators::{to_duration, OrderAttributeSource, ProcessingTimeSource};
use super::order::{Order, OrderAttributes, OrderState};
use super::routing::RoutingTable;
use super::station::{Lease, StationSet};
use super::types::{OrderId, SimTime, StationId};
use crate::release::{PooledOrder, ReleaseControl};
use crate::stats::{ExportRow, PerformanceSummary, StatisticsTracker};
use log::{debug, info};
use std::collections::HashMap;

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when simulated time moves forward
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called when a simulation step completes
    fn on_step_complete(&mut self, time: SimTime, events_processed: usize, stations: &StationSet);
}

/// Discrete-event engine for the shop floor.
///
/// Owns the clock, the stations, every order and the release and statistics
/// layers. Order lifecycles are driven as state machines by [`ShopEvent`]s.
pub struct SimulationEngine {
    scheduler: EventScheduler,
    now: SimTime,
    horizon: SimTime,
    new_order_time: SimTime,
    routing: RoutingTable,
    stations: StationSet,
    /// Every order created so far, unless finished ones are being dropped
    orders: HashMap<OrderId, Order>,
    retain_finished_orders: bool,
    leases: HashMap<OrderId, Lease>,
    last_order_id: OrderId,
    release: ReleaseControl,
    tracker: StatisticsTracker,
    processing_times: Box<dyn ProcessingTimeSource>,
    order_source: Box<dyn OrderAttributeSource>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    /// Assemble an engine and schedule the first generation tick.
    ///
    /// Use [`SimulationBuilder`](super::simulation_builder::SimulationBuilder)
    /// to get validated parts from a config.
    pub fn new(
        routing: RoutingTable,
        release: ReleaseControl,
        processing_times: Box<dyn ProcessingTimeSource>,
        order_source: Box<dyn OrderAttributeSource>,
        first_order_time: SimTime,
        new_order_time: SimTime,
        horizon: SimTime,
    ) -> Self {
        let stations = StationSet::new(routing.stations());
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_at(ShopEvent::GenerateOrder, first_order_time);

        Self {
            scheduler,
            now: 0,
            horizon,
            new_order_time: new_order_time.max(1),
            routing,
            stations,
            orders: HashMap::new(),
            retain_finished_orders: true,
            leases: HashMap::new(),
            last_order_id: 0,
            release,
            tracker: StatisticsTracker::new(),
            processing_times,
            order_source,
            observers: Vec::new(),
        }
    }

    /// Without retention, finished orders leave the order map as they finish
    /// and [`finished_orders`](Self::finished_orders) stays empty.
    pub fn set_finished_order_retention(&mut self, retain: bool) {
        self.retain_finished_orders = retain;
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Notify all observers of a time advance
    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    /// Notify all observers of step completion
    fn notify_step_complete(&mut self, events_processed: usize) {
        for observer in &mut self.observers {
            observer.on_step_complete(self.now, events_processed, &self.stations);
        }
    }

    /// Run to the configured horizon, returns the time of the last step
    pub fn run(&mut self) -> Result<SimTime> {
        self.run_until(self.horizon)
    }

    /// Process every event scheduled strictly before `until`.
    ///
    /// Later events stay queued and are never reported; orders caught mid-route
    /// simply stay unfinished.
    pub fn run_until(&mut self, until: SimTime) -> Result<SimTime> {
        info!(
            "[Engine] Running {} until {}",
            self.release.policy().label(),
            until
        );

        while let Some(next_time) = self.scheduler.peek_next_time() {
            if next_time >= until {
                break;
            }
            if !self.step()? {
                break;
            }
        }

        info!(
            "[Engine] Stopped at {}: {} orders created, {} finished, {} events pending",
            self.now,
            self.last_order_id,
            self.tracker.finished_records().len(),
            self.scheduler.len()
        );
        Ok(self.now)
    }

    /// Process one time step, returns true if events remain
    ///
    /// A step handles every event queued for the earliest pending time, in
    /// scheduling order.
    pub fn step(&mut self) -> Result<bool> {
        let Some(next_time) = self.scheduler.peek_next_time() else {
            return Ok(false);
        };

        let old_time = self.now;
        self.now = next_time;
        if old_time != self.now {
            self.notify_time_advance(old_time, self.now);
        }

        let events = self.scheduler.get_next_time_events();
        let events_count = events.len();

        for event in events {
            self.handle_event(event)?;
        }

        self.notify_step_complete(events_count);

        Ok(self.scheduler.has_events())
    }

    fn handle_event(&mut self, event: ShopEvent) -> Result<()> {
        match event.order_id() {
            Some(order_id) => debug!(
                "[Engine] {} for order {} at {}",
                event.event_type(),
                order_id,
                self.now
            ),
            None => debug!("[Engine] {} at {}", event.event_type(), self.now),
        }

        match event {
            ShopEvent::GenerateOrder => self.handle_generate_order(),
            ShopEvent::StartLifecycle(order_id) => self.request_current_station(order_id),
            ShopEvent::ProcessingComplete { order_id, station } => {
                self.handle_processing_complete(order_id, station)
            }
        }
    }

    /// Generation tick: maybe create an order, then check the periodic trigger
    fn handle_generate_order(&mut self) -> Result<()> {
        if let Some(attributes) = self.order_source.next_order(self.now) {
            self.create_order(attributes)?;
        }

        let due = self.release.on_tick(self.now);
        self.start_released(due)?;

        self.scheduler
            .schedule_timeout(ShopEvent::GenerateOrder, self.now, self.new_order_time);
        Ok(())
    }

    fn create_order(&mut self, attributes: OrderAttributes) -> Result<OrderId> {
        let route = self.routing.route(attributes.product_type)?.to_vec();
        let order_id = self.last_order_id + 1;
        self.last_order_id = order_id;

        let mut order = Order::new(order_id, attributes, route, self.now);
        self.tracker
            .on_created(&order, self.release.current_period(), &self.stations);
        let released = self.release.admit(&mut order);

        debug!(
            "[Order:{}] Created at {}: product type {}, due {}",
            order_id, self.now, order.product_type, order.due_date
        );
        self.orders.insert(order_id, order);
        self.start_released(released)?;
        Ok(order_id)
    }

    /// Mark orders released and queue their first station request, in order
    fn start_released(&mut self, released: Vec<PooledOrder>) -> Result<()> {
        for pooled in released {
            let order = self
                .orders
                .get_mut(&pooled.order_id)
                .ok_or(ShopError::UnknownOrder(pooled.order_id))?;
            order.mark_released(self.now);
            self.tracker.on_released(pooled.order_id, self.now);
            self.scheduler
                .schedule_timeout(ShopEvent::StartLifecycle(pooled.order_id), self.now, 0);
        }
        Ok(())
    }

    /// Ask for the station of the order's current routing step
    fn request_current_station(&mut self, order_id: OrderId) -> Result<()> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(ShopError::UnknownOrder(order_id))?;
        let station_id = order
            .current_station()
            .ok_or(ShopError::EmptyRoute(order.product_type))?;

        debug!(
            "[Order:{}] Arrives at station {} at {}",
            order_id, station_id, self.now
        );

        match self.stations.get_mut(station_id)?.acquire(order_id) {
            Some(lease) => self.begin_processing(lease),
            None => {
                order.state = OrderState::Waiting(station_id);
                Ok(())
            }
        }
    }

    /// Draw the processing time and hold the station for it
    fn begin_processing(&mut self, lease: Lease) -> Result<()> {
        let order_id = lease.order_id();
        let station = lease.station();
        let duration = to_duration(self.processing_times.sample(station));

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(ShopError::UnknownOrder(order_id))?;
        order.state = OrderState::Processing(station);

        debug!(
            "[Order:{}] Processed at station {} from {} for {}",
            order_id, station, self.now, duration
        );

        self.leases.insert(order_id, lease);
        self.scheduler.schedule_timeout(
            ShopEvent::ProcessingComplete { order_id, station },
            self.now,
            duration,
        );
        Ok(())
    }

    fn handle_processing_complete(&mut self, order_id: OrderId, station: StationId) -> Result<()> {
        let lease = self
            .leases
            .remove(&order_id)
            .ok_or(ShopError::LeaseMissing(order_id))?;

        // The next waiting order gets the station before this one moves on
        if let Some(next) = self.stations.get_mut(station)?.release(lease)? {
            self.begin_processing(next)?;
        }

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(ShopError::UnknownOrder(order_id))?;
        let finished = order.complete_step(self.now);
        self.tracker.on_station_complete(order, station, self.now);

        if finished {
            debug!("[Order:{}] Finished at {}", order_id, self.now);
            if !self.retain_finished_orders {
                self.orders.remove(&order_id);
            }
            Ok(())
        } else {
            self.request_current_station(order_id)
        }
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn release_control(&self) -> &ReleaseControl {
        &self.release
    }

    pub fn tracker(&self) -> &StatisticsTracker {
        &self.tracker
    }

    /// Orders currently held in memory
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Number of orders created so far
    pub fn orders_created(&self) -> u64 {
        self.last_order_id
    }

    /// Finished orders still held by the engine, in finish order
    pub fn finished_orders(&self) -> Vec<&Order> {
        self.tracker
            .finished_records()
            .iter()
            .filter_map(|record| self.orders.get(&record.order_id))
            .collect()
    }

    pub fn summary(&self) -> PerformanceSummary {
        self.tracker.summary()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.tracker.export_rows()
    }
}
