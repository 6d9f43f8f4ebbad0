use super::tracker::{FeatureRecord, TrackingRecord};
use crate::core::error::Result;
use crate::core::types::{OrderId, PeriodIndex, ProductType, SimTime};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported row per finished order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub order_id: OrderId,
    pub product_type: ProductType,
    pub due_date: SimTime,
    pub time_created: SimTime,
    pub period_created: PeriodIndex,
    pub time_released: SimTime,
    pub time_finished: SimTime,
    pub sftt: SimTime,
    pub wip: usize,
    pub nb_order_queue_routing: usize,
    pub last_sftt: f64,
    pub last_5_sftt_mean: f64,
    pub last_5_sftt_median: f64,
    pub last_50_sftt_mean: f64,
    pub last_50_sftt_median: f64,
}

impl ExportRow {
    pub const COLUMNS: [&'static str; 15] = [
        "order_id",
        "product_type",
        "due_date",
        "time_created",
        "period_created",
        "time_released",
        "time_finished",
        "sftt",
        "wip",
        "nb_order_queue_routing",
        "last_sftt",
        "last_5_sftt_mean",
        "last_5_sftt_median",
        "last_50_sftt_mean",
        "last_50_sftt_median",
    ];

    /// Left join on `order_id`; missing values become 0
    pub fn join(record: &TrackingRecord, features: Option<&FeatureRecord>) -> Self {
        let features = features.cloned().unwrap_or_default();
        Self {
            order_id: record.order_id,
            product_type: record.product_type,
            due_date: record.due_date,
            time_created: record.time_created,
            period_created: record.period_created,
            time_released: record.time_released.unwrap_or(0),
            time_finished: record.time_finished.unwrap_or(0),
            sftt: record.sftt.unwrap_or(0),
            wip: features.wip,
            nb_order_queue_routing: features.nb_order_queue_routing,
            last_sftt: features.last_sftt,
            last_5_sftt_mean: features.last_5_sftt_mean,
            last_5_sftt_median: features.last_5_sftt_median,
            last_50_sftt_mean: features.last_50_sftt_mean,
            last_50_sftt_median: features.last_50_sftt_median,
        }
    }
}

/// Write rows as CSV with a header line, even when there are no rows
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(ExportRow::COLUMNS)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(rows: &[ExportRow], path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, file)
}
