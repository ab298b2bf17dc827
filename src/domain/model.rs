use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::str::FromStr;

/// One source record after the transposed orientation has been
/// normalized, all fields still raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOrder {
    pub order_id: String,
    pub customer_id: String,
    pub created_at: String,
    pub amount: String,
}

/// A `RawOrder` after type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub created_at: NaiveDateTime,
    pub amount: i64,
}

impl Order {
    /// Calendar date of the order, time-of-day discarded.
    pub fn date(&self) -> NaiveDate {
        self.created_at.date()
    }
}

/// Aggregated spend for one `(customerId, date)` pair. Serialized field
/// names match the destination table schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDayStats {
    pub customer_id: String,
    pub date: NaiveDate,
    pub total_amount: i64,
    pub avg_amount: f64,
    pub median_amount: f64,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub stats: Vec<CustomerDayStats>,
    pub source_records: usize,
}

/// How the sink treats rows already present for the run's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Plain append; re-running the same file duplicates rows.
    #[default]
    Append,
    /// Delete existing rows for the dates being written, then append.
    ReplaceDate,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "append" => Ok(WriteMode::Append),
            "replace-date" => Ok(WriteMode::ReplaceDate),
            other => Err(format!(
                "unknown write mode '{}', expected 'append' or 'replace-date'",
                other
            )),
        }
    }
}
