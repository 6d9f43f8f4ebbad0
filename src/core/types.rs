/// Simulated time in integer units (minutes in the default configuration).
pub type SimTime = u64;

/// Sequential order identifier, starting at 1 and never reused within a run.
pub type OrderId = u64;

/// Station identifier as it appears in routing sequences.
pub type StationId = u32;

/// Product type key of the routing table.
pub type ProductType = u32;

/// Index of a release period, `floor(time / period_length)`.
///
/// Signed because a planned release date can precede time zero.
pub type PeriodIndex = i64;
