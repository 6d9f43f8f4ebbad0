use super::types::{OrderId, StationId};

/// Everything the scheduling loop can resume.
///
/// An order lifecycle is a state machine; each variant is the continuation
/// that picks it up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopEvent {
    /// Order-generation tick: create an order and check the periodic release trigger
    GenerateOrder,
    /// A released order issues its first station request
    StartLifecycle(OrderId),
    /// The timed hold of `station` by `order_id` has elapsed
    ProcessingComplete {
        order_id: OrderId,
        station: StationId,
    },
}

impl ShopEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ShopEvent::GenerateOrder => "GenerateOrder",
            ShopEvent::StartLifecycle(_) => "StartLifecycle",
            ShopEvent::ProcessingComplete { .. } => "ProcessingComplete",
        }
    }

    /// Order the event belongs to, if any
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            ShopEvent::GenerateOrder => None,
            ShopEvent::StartLifecycle(id) => Some(*id),
            ShopEvent::ProcessingComplete { order_id, .. } => Some(*order_id),
        }
    }
}
