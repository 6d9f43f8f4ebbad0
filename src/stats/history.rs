use crate::core::types::SimTime;
use std::collections::VecDeque;

/// Longest window any feature looks back over
pub const HISTORY_CAPACITY: usize = 50;

/// Flow times of the most recently finished orders of one product type
///
/// Newest last. Every statistic over an empty history is 0.
#[derive(Debug, Clone)]
pub struct FlowTimeHistory {
    flow_times: VecDeque<SimTime>,
    capacity: usize,
}

impl FlowTimeHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "FlowTimeHistory capacity must be > 0");
        Self {
            flow_times: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, flow_time: SimTime) {
        if self.flow_times.len() == self.capacity {
            self.flow_times.pop_front();
        }
        self.flow_times.push_back(flow_time);
    }

    pub fn len(&self) -> usize {
        self.flow_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flow_times.is_empty()
    }

    /// Most recent flow time, 0 when empty
    pub fn last(&self) -> f64 {
        self.flow_times.back().map(|v| *v as f64).unwrap_or(0.0)
    }

    /// The `n` most recent flow times, oldest first
    fn recent(&self, n: usize) -> impl Iterator<Item = SimTime> + '_ {
        let skip = self.flow_times.len().saturating_sub(n);
        self.flow_times.iter().skip(skip).copied()
    }

    /// Mean over the last `n` entries, or over all of them if fewer exist
    pub fn mean_of_last(&self, n: usize) -> f64 {
        let window: Vec<SimTime> = self.recent(n).collect();
        if window.is_empty() {
            return 0.0;
        }
        window.iter().map(|v| *v as f64).sum::<f64>() / window.len() as f64
    }

    /// Median over the last `n` entries; even counts average the middle pair
    pub fn median_of_last(&self, n: usize) -> f64 {
        let mut window: Vec<SimTime> = self.recent(n).collect();
        if window.is_empty() {
            return 0.0;
        }
        window.sort_unstable();
        let mid = window.len() / 2;
        if window.len() % 2 == 0 {
            (window[mid - 1] as f64 + window[mid] as f64) / 2.0
        } else {
            window[mid] as f64
        }
    }
}

impl Default for FlowTimeHistory {
    fn default() -> Self {
        Self::new()
    }
}
