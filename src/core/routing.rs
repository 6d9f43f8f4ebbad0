use super::error::{Result, ShopError};
use super::types::{ProductType, StationId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable mapping from product type to its ordered station sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: BTreeMap<ProductType, Vec<StationId>>,
}

impl RoutingTable {
    /// Build a validated routing table
    pub fn new(routes: BTreeMap<ProductType, Vec<StationId>>) -> Result<Self> {
        let table = Self { routes };
        table.validate()?;
        Ok(table)
    }

    /// Build from `(product_type, route)` pairs
    pub fn from_routes<I, R>(routes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ProductType, R)>,
        R: Into<Vec<StationId>>,
    {
        Self::new(
            routes
                .into_iter()
                .map(|(product_type, route)| (product_type, route.into()))
                .collect(),
        )
    }

    /// Reject tables that leave some product type without a last station
    pub fn validate(&self) -> Result<()> {
        if self.routes.is_empty() {
            return Err(ShopError::InvalidConfig(
                "routing table has no product types".to_string(),
            ));
        }
        match self.routes.iter().find(|(_, route)| route.is_empty()) {
            Some((product_type, _)) => Err(ShopError::EmptyRoute(*product_type)),
            None => Ok(()),
        }
    }

    pub fn route(&self, product_type: ProductType) -> Result<&[StationId]> {
        match self.routes.get(&product_type) {
            Some(route) if route.is_empty() => Err(ShopError::EmptyRoute(product_type)),
            Some(route) => Ok(route),
            None => Err(ShopError::MissingRoute(product_type)),
        }
    }

    /// Station whose completion finishes an order of `product_type`
    pub fn last_station(&self, product_type: ProductType) -> Result<StationId> {
        self.route(product_type)
            .and_then(|route| route.last().copied().ok_or(ShopError::EmptyRoute(product_type)))
    }

    pub fn product_types(&self) -> impl Iterator<Item = ProductType> + '_ {
        self.routes.keys().copied()
    }

    /// Every station referenced by at least one route
    pub fn stations(&self) -> BTreeSet<StationId> {
        self.routes.values().flatten().copied().collect()
    }
}

impl Default for RoutingTable {
    /// Three stations, five product types
    fn default() -> Self {
        Self {
            routes: BTreeMap::from([
                (1, vec![1, 2, 3]),
                (2, vec![2, 3, 1]),
                (3, vec![3, 2, 1]),
                (4, vec![3, 1]),
                (5, vec![2, 3]),
            ]),
        }
    }
}
