use super::types::{OrderId, ProductType, StationId};
use thiserror::Error;

/// Errors that abort a simulation run or its surrounding tooling
#[derive(Debug, Error)]
pub enum ShopError {
    /// The order generator produced a product type the routing table does not know
    #[error("no routing entry for product type {0}")]
    MissingRoute(ProductType),

    /// A routing entry exists but lists no stations
    #[error("routing for product type {0} is empty")]
    EmptyRoute(ProductType),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A lease was handed back to a station that did not issue it
    #[error("station {station} cannot accept a lease issued by station {lease_station}")]
    ForeignLease {
        station: StationId,
        lease_station: StationId,
    },

    /// An order finished processing without holding its station
    #[error("order {0} completed processing without holding a station")]
    LeaseMissing(OrderId),

    #[error("order {0} is not known to the engine")]
    UnknownOrder(OrderId),

    #[error("station {0} is not part of the shop floor")]
    UnknownStation(StationId),

    #[error("configuration could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("thread pool could not be built: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ShopError>;
