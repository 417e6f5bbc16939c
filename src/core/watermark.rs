// Watermark value, its persisted shape and the incremental fetch window derived from it.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lower bound used when no run has ever succeeded: fetch everything.
pub const BACKFILL_FROM: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => panic!("invalid backfill date"),
};

pub const CONTENT_TYPE: &str = "application/json";

/// Body of the checkpoint object: `{"last_successful_run": "YYYY-MM-DD"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub last_successful_run: NaiveDate,
}

/// Inclusive date range of records to request from the incremental endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FetchWindow {
    /// `[watermark, run_date + 1]`. The extra day tolerates clock and timezone skew
    /// between this host and the API's update timestamps.
    pub fn incremental(watermark: NaiveDate, run_date: NaiveDate) -> Self {
        let to = run_date.checked_add_days(Days::new(1)).unwrap_or(run_date);
        Self { from: watermark, to }
    }

    pub fn as_query_value(&self) -> String {
        format!("{},{}", self.from.format("%Y-%m-%d"), self.to.format("%Y-%m-%d"))
    }
}
