use super::event::ShopEvent;
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub sequence_num: u64,
    pub event: ShopEvent,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Future event list ordered by time, then by scheduling order
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule an event at an absolute simulated time
    pub fn schedule_at(&mut self, event: ShopEvent, time: SimTime) {
        let scheduled_event = ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Schedule an event `delay` time units after `now`
    pub fn schedule_timeout(&mut self, event: ShopEvent, now: SimTime, delay: SimTime) {
        self.schedule_at(event, now.saturating_add(delay));
    }

    /// Get all events scheduled for the next time step, in scheduling order
    ///
    /// Events scheduled while these are handled land in a later batch, even at
    /// the same time, behind everything already queued.
    pub fn get_next_time_events(&mut self) -> Vec<ShopEvent> {
        let mut events = Vec::new();

        if let Some(next_time) = self.peek_next_time() {
            while self
                .event_queue
                .peek()
                .is_some_and(|scheduled| scheduled.time == next_time)
            {
                if let Some(scheduled_event) = self.event_queue.pop() {
                    events.push(scheduled_event.event);
                }
            }
        }

        events
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Get the next event time without removing events
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.time)
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
