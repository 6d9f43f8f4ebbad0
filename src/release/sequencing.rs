use super::pool::PooledOrder;
use serde::{Deserialize, Serialize};

/// Order in which simultaneously released orders start their lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencingRule {
    /// Ascending due date
    #[serde(rename = "EDD")]
    EarliestDueDate,
    /// Ascending planned release date
    #[serde(rename = "PRD")]
    EarliestPlannedRelease,
}

impl SequencingRule {
    /// Stable sort: ties keep the order the pool handed them out in
    pub fn sequence(&self, orders: &mut [PooledOrder]) {
        match self {
            SequencingRule::EarliestDueDate => orders.sort_by_key(|order| order.due_date),
            SequencingRule::EarliestPlannedRelease => {
                orders.sort_by_key(|order| order.planned_release)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SequencingRule::EarliestDueDate => "EDD",
            SequencingRule::EarliestPlannedRelease => "PRD",
        }
    }
}

impl Default for SequencingRule {
    fn default() -> Self {
        SequencingRule::EarliestDueDate
    }
}
