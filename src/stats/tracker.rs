use super::export::ExportRow;
use super::history::FlowTimeHistory;
use crate::core::order::Order;
use crate::core::station::StationSet;
use crate::core::types::{OrderId, PeriodIndex, ProductType, SimTime, StationId};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

/// Per-order tracking data, mutable until the order finishes
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingRecord {
    pub order_id: OrderId,
    pub product_type: ProductType,
    pub due_date: SimTime,
    pub time_created: SimTime,
    pub period_created: PeriodIndex,
    pub time_released: Option<SimTime>,
    pub time_finished: Option<SimTime>,
    /// Shop floor throughput time: finish minus release
    pub sftt: Option<SimTime>,
}

/// Shop state observed when an order is created
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRecord {
    pub order_id: OrderId,
    pub wip: usize,
    pub nb_order_queue_routing: usize,
    pub last_sftt: f64,
    pub last_5_sftt_mean: f64,
    pub last_5_sftt_median: f64,
    pub last_50_sftt_mean: f64,
    pub last_50_sftt_median: f64,
}

/// Due-date performance of a run so far
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub generated: u64,
    pub released: u64,
    pub finished: u64,
    pub early: u64,
    pub tardy: u64,
    pub total_earliness: u64,
    pub total_tardiness: u64,
}

impl PerformanceSummary {
    /// `None` when no order finished early
    pub fn mean_earliness(&self) -> Option<f64> {
        (self.early > 0).then(|| self.total_earliness as f64 / self.early as f64)
    }

    /// `None` when no order finished tardy
    pub fn mean_tardiness(&self) -> Option<f64> {
        (self.tardy > 0).then(|| self.total_tardiness as f64 / self.tardy as f64)
    }

    /// Orders generated but not finished: pooled, queued, in service
    pub fn unfinished(&self) -> u64 {
        self.generated - self.finished
    }
}

/// Records creation, release and finish of every order
#[derive(Debug, Clone, Default)]
pub struct StatisticsTracker {
    active: HashMap<OrderId, TrackingRecord>,
    finished: Vec<TrackingRecord>,
    features: Vec<FeatureRecord>,
    feature_index: HashMap<OrderId, usize>,
    histories: BTreeMap<ProductType, FlowTimeHistory>,
    generated: u64,
    released: u64,
    early: u64,
    tardy: u64,
    total_earliness: u64,
    total_tardiness: u64,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Features of a new order from the current shop state
    pub fn compute_features(&self, order: &Order, stations: &StationSet) -> FeatureRecord {
        let mut features = FeatureRecord {
            order_id: order.id,
            wip: stations.wip(),
            nb_order_queue_routing: stations.queued_along(&order.route),
            ..FeatureRecord::default()
        };
        if let Some(history) = self.histories.get(&order.product_type) {
            features.last_sftt = history.last();
            features.last_5_sftt_mean = history.mean_of_last(5);
            features.last_5_sftt_median = history.median_of_last(5);
            features.last_50_sftt_mean = history.mean_of_last(50);
            features.last_50_sftt_median = history.median_of_last(50);
        }
        features
    }

    /// Open a tracking record and store the creation-time features
    pub fn on_created(&mut self, order: &Order, period: PeriodIndex, stations: &StationSet) -> &FeatureRecord {
        self.generated += 1;
        self.active.insert(
            order.id,
            TrackingRecord {
                order_id: order.id,
                product_type: order.product_type,
                due_date: order.due_date,
                time_created: order.created,
                period_created: period,
                time_released: None,
                time_finished: None,
                sftt: None,
            },
        );

        let features = self.compute_features(order, stations);
        debug!(
            "[Tracker] Order {} created: wip {}, queued on route {}",
            order.id, features.wip, features.nb_order_queue_routing
        );
        let index = self.features.len();
        self.features.push(features);
        self.feature_index.insert(order.id, index);
        &self.features[index]
    }

    pub fn on_released(&mut self, order_id: OrderId, now: SimTime) {
        if let Some(record) = self.active.get_mut(&order_id) {
            record.time_released = Some(now);
            self.released += 1;
        }
    }

    /// Called after every station completion; closes the record on the last one
    pub fn on_station_complete(&mut self, order: &Order, station: StationId, now: SimTime) {
        debug!("[Tracker] Order {} left station {} at {}", order.id, station, now);
        if order.is_finished() {
            self.on_finished(order, now);
        }
    }

    fn on_finished(&mut self, order: &Order, now: SimTime) {
        let Some(mut record) = self.active.remove(&order.id) else {
            return;
        };

        let released = record.time_released.unwrap_or(record.time_created);
        let sftt = now.saturating_sub(released);
        record.time_finished = Some(now);
        record.sftt = Some(sftt);

        // Finishing exactly on the due date is tardy with zero tardiness
        if now < record.due_date {
            self.early += 1;
            self.total_earliness += record.due_date - now;
        } else {
            self.tardy += 1;
            self.total_tardiness += now - record.due_date;
        }

        self.histories
            .entry(record.product_type)
            .or_default()
            .push(sftt);

        debug!(
            "[Tracker] Order {} finished at {} (due {}, sftt {})",
            order.id, now, record.due_date, sftt
        );
        self.finished.push(record);
    }

    /// Records of orders still pooled or on the floor
    pub fn active_record(&self, order_id: OrderId) -> Option<&TrackingRecord> {
        self.active.get(&order_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Finished records in finish order
    pub fn finished_records(&self) -> &[TrackingRecord] {
        &self.finished
    }

    pub fn features(&self, order_id: OrderId) -> Option<&FeatureRecord> {
        self.feature_index
            .get(&order_id)
            .map(|index| &self.features[*index])
    }

    pub fn feature_records(&self) -> &[FeatureRecord] {
        &self.features
    }

    pub fn history(&self, product_type: ProductType) -> Option<&FlowTimeHistory> {
        self.histories.get(&product_type)
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            generated: self.generated,
            released: self.released,
            finished: self.finished.len() as u64,
            early: self.early,
            tardy: self.tardy,
            total_earliness: self.total_earliness,
            total_tardiness: self.total_tardiness,
        }
    }

    /// Finished orders joined with their features, one row per order
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.finished
            .iter()
            .map(|record| ExportRow::join(record, self.features(record.order_id)))
            .collect()
    }

    pub fn log_summary(&self, scenario: &str) {
        let summary = self.summary();
        info!("[Tracker] {}: {} orders were created", scenario, summary.generated);
        info!("[Tracker] {}: {} orders were finished", scenario, summary.finished);
        info!("[Tracker] {}: {} orders were finished in time", scenario, summary.early);
        info!("[Tracker] {}: {} orders were finished too late", scenario, summary.tardy);
        match summary.mean_earliness() {
            Some(mean) => info!("[Tracker] {}: mean earliness {:.2}", scenario, mean),
            None => info!("[Tracker] {}: mean earliness n/a (no early orders)", scenario),
        }
        match summary.mean_tardiness() {
            Some(mean) => info!("[Tracker] {}: mean tardiness {:.2}", scenario, mean),
            None => info!("[Tracker] {}: mean tardiness n/a (no tardy orders)", scenario),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::order::OrderAttributes;

    fn order(id: OrderId, product_type: ProductType, due_date: SimTime, created: SimTime) -> Order {
        Order::new(
            id,
            OrderAttributes {
                product_type,
                due_date,
            },
            vec![1, 2],
            created,
        )
    }

    fn finish(tracker: &mut StatisticsTracker, order: &mut Order, released: SimTime, finished: SimTime) {
        order.mark_released(released);
        tracker.on_released(order.id, released);
        order.complete_step(released);
        tracker.on_station_complete(order, 1, released);
        order.complete_step(finished);
        tracker.on_station_complete(order, 2, finished);
    }

    #[test]
    fn test_record_moves_to_finished_table() {
        let stations = StationSet::new([1, 2]);
        let mut tracker = StatisticsTracker::new();
        let mut o = order(1, 1, 500, 0);
        tracker.on_created(&o, 0, &stations);
        assert!(tracker.active_record(1).is_some());

        finish(&mut tracker, &mut o, 10, 300);

        assert!(tracker.active_record(1).is_none());
        let record = &tracker.finished_records()[0];
        assert_eq!(record.time_released, Some(10));
        assert_eq!(record.time_finished, Some(300));
        assert_eq!(record.sftt, Some(290));
        assert_eq!(tracker.history(1).unwrap().last(), 290.0);
    }

    #[test]
    fn test_due_date_boundary_is_tardy() {
        let stations = StationSet::new([1, 2]);
        let mut tracker = StatisticsTracker::new();

        let mut one_early = order(1, 1, 200, 0);
        let mut on_due = order(2, 1, 200, 0);
        let mut one_late = order(3, 1, 200, 0);
        tracker.on_created(&one_early, 0, &stations);
        tracker.on_created(&on_due, 0, &stations);
        tracker.on_created(&one_late, 0, &stations);
        finish(&mut tracker, &mut one_early, 0, 199);
        finish(&mut tracker, &mut on_due, 0, 200);
        finish(&mut tracker, &mut one_late, 0, 201);

        let summary = tracker.summary();
        assert_eq!(summary.early, 1);
        assert_eq!(summary.tardy, 2);
        assert_eq!(summary.total_earliness, 1);
        assert_eq!(summary.total_tardiness, 1);
        assert_eq!(summary.mean_tardiness(), Some(0.5));
        assert_eq!(summary.finished, summary.early + summary.tardy);
    }

    #[test]
    fn test_empty_populations_have_no_mean() {
        let tracker = StatisticsTracker::new();
        let summary = tracker.summary();
        assert_eq!(summary.mean_earliness(), None);
        assert_eq!(summary.mean_tardiness(), None);
        assert_eq!(summary.unfinished(), 0);
    }

    #[test]
    fn test_features_use_same_product_history_only() {
        let stations = StationSet::new([1, 2]);
        let mut tracker = StatisticsTracker::new();
        for (id, flow) in [(1u64, 100u64), (2, 200), (3, 600)] {
            let mut o = order(id, 1, 10_000, 0);
            tracker.on_created(&o, 0, &stations);
            finish(&mut tracker, &mut o, 0, flow);
        }

        let same = order(4, 1, 10_000, 700);
        let other = order(5, 2, 10_000, 700);
        let same_features = tracker.on_created(&same, 0, &stations).clone();
        let other_features = tracker.on_created(&other, 0, &stations).clone();

        assert_eq!(same_features.last_sftt, 600.0);
        assert_eq!(same_features.last_5_sftt_mean, 300.0);
        assert_eq!(same_features.last_5_sftt_median, 200.0);
        assert_eq!(other_features, FeatureRecord { order_id: 5, ..FeatureRecord::default() });
        assert_eq!(tracker.features(4), Some(&same_features));
    }

    #[test]
    fn test_export_rows_join_features() {
        let mut stations = StationSet::new([1, 2]);
        let _busy = stations.get_mut(1).unwrap().acquire(99);
        let mut tracker = StatisticsTracker::new();
        let mut o = order(1, 1, 500, 0);
        tracker.on_created(&o, 3, &stations);
        finish(&mut tracker, &mut o, 0, 100);

        let rows = tracker.export_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_id, 1);
        assert_eq!(rows[0].period_created, 3);
        assert_eq!(rows[0].wip, 1);
        assert_eq!(rows[0].sftt, 100);
    }
}
