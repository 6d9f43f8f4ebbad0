use super::error::{Result, ShopError};
use super::types::{OrderId, StationId};
use log::debug;
use std::collections::{BTreeMap, VecDeque};

/// Proof that an order holds a station.
///
/// Only a [`Station`] creates leases, and the only way to end one is to hand
/// it back through [`Station::release`], so every grant is paired with
/// exactly one release.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a lease must be handed back to its station"]
pub struct Lease {
    station: StationId,
    order_id: OrderId,
}

impl Lease {
    pub fn station(&self) -> StationId {
        self.station
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }
}

/// Single-capacity resource with a FIFO wait queue
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    holder: Option<OrderId>,
    queue: VecDeque<OrderId>,
    completed: u64,
}

impl Station {
    pub fn new(id: StationId) -> Self {
        Self {
            id,
            holder: None,
            queue: VecDeque::new(),
            completed: 0,
        }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    /// Request the station for `order_id`.
    ///
    /// Returns the lease straight away when the station is idle and nobody is
    /// waiting; otherwise the order joins the back of the queue and `None` is
    /// returned. The lease for a queued order comes out of a later `release`.
    pub fn acquire(&mut self, order_id: OrderId) -> Option<Lease> {
        if self.holder.is_none() && self.queue.is_empty() {
            self.holder = Some(order_id);
            debug!("[Station:{}] Granted to order {} immediately", self.id, order_id);
            Some(Lease {
                station: self.id,
                order_id,
            })
        } else {
            self.queue.push_back(order_id);
            debug!(
                "[Station:{}] Order {} queued (queue length: {})",
                self.id,
                order_id,
                self.queue.len()
            );
            None
        }
    }

    /// Free the station and grant it to the longest-waiting order, if any.
    pub fn release(&mut self, lease: Lease) -> Result<Option<Lease>> {
        if lease.station != self.id || self.holder != Some(lease.order_id) {
            return Err(ShopError::ForeignLease {
                station: self.id,
                lease_station: lease.station,
            });
        }

        self.completed += 1;
        self.holder = self.queue.pop_front();

        Ok(self.holder.map(|order_id| {
            debug!("[Station:{}] Handed over to waiting order {}", self.id, order_id);
            Lease {
                station: self.id,
                order_id,
            }
        }))
    }

    pub fn is_busy(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<OrderId> {
        self.holder
    }

    /// Orders waiting, not counting the one in service
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn waiting(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.queue.iter().copied()
    }

    /// Number of holds that have been released
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

/// All stations of the shop floor, keyed by id
#[derive(Debug, Clone, Default)]
pub struct StationSet {
    stations: BTreeMap<StationId, Station>,
}

impl StationSet {
    pub fn new(ids: impl IntoIterator<Item = StationId>) -> Self {
        Self {
            stations: ids.into_iter().map(|id| (id, Station::new(id))).collect(),
        }
    }

    pub fn get(&self, id: StationId) -> Result<&Station> {
        self.stations.get(&id).ok_or(ShopError::UnknownStation(id))
    }

    pub fn get_mut(&mut self, id: StationId) -> Result<&mut Station> {
        self.stations.get_mut(&id).ok_or(ShopError::UnknownStation(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Work in process: every queued order plus every order in service
    pub fn wip(&self) -> usize {
        self.stations
            .values()
            .map(|station| station.queue_len() + usize::from(station.is_busy()))
            .sum()
    }

    /// Orders waiting in front of the stations of `route`.
    ///
    /// A station listed twice on the route is counted twice.
    pub fn queued_along(&self, route: &[StationId]) -> usize {
        route
            .iter()
            .filter_map(|id| self.stations.get(id))
            .map(Station::queue_len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_station_grants_immediately() {
        let mut station = Station::new(1);
        let lease = station.acquire(7).expect("idle station grants");
        assert_eq!(lease.order_id(), 7);
        assert_eq!(lease.station(), 1);
        assert!(station.is_busy());
        assert_eq!(station.queue_len(), 0);
    }

    #[test]
    fn test_release_hands_over_in_arrival_order() {
        let mut station = Station::new(2);
        let first = station.acquire(1).unwrap();
        assert!(station.acquire(3).is_none());
        assert!(station.acquire(2).is_none());
        assert_eq!(station.waiting().collect::<Vec<_>>(), vec![3, 2]);

        let second = station.release(first).unwrap().unwrap();
        assert_eq!(second.order_id(), 3);
        assert_eq!(station.holder(), Some(3));

        let third = station.release(second).unwrap().unwrap();
        assert_eq!(third.order_id(), 2);

        assert!(station.release(third).unwrap().is_none());
        assert!(!station.is_busy());
        assert_eq!(station.completed(), 3);
    }

    #[test]
    fn test_foreign_lease_is_rejected() {
        let mut one = Station::new(1);
        let mut two = Station::new(2);
        let lease = one.acquire(1).unwrap();
        let _held = two.acquire(2).unwrap();

        match two.release(lease) {
            Err(ShopError::ForeignLease {
                station,
                lease_station,
            }) => {
                assert_eq!(station, 2);
                assert_eq!(lease_station, 1);
            }
            other => panic!("expected ForeignLease, got {:?}", other),
        }
    }

    #[test]
    fn test_wip_counts_queued_and_busy() {
        let mut set = StationSet::new([1, 2, 3]);
        let _a = set.get_mut(1).unwrap().acquire(1);
        let _b = set.get_mut(1).unwrap().acquire(2);
        let _c = set.get_mut(1).unwrap().acquire(3);
        let _d = set.get_mut(3).unwrap().acquire(4);

        assert_eq!(set.wip(), 4);
        assert_eq!(set.queued_along(&[1, 2, 3]), 2);
        assert_eq!(set.queued_along(&[1, 1]), 4);
        assert_eq!(set.queued_along(&[2]), 0);
    }

    #[test]
    fn test_unknown_station_lookup_fails() {
        let set = StationSet::new([1]);
        assert!(matches!(set.get(9), Err(ShopError::UnknownStation(9))));
    }
}
