//! Order id projection and CSV rendering

use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::orders::Order;

/// Single column of the export file
pub const CSV_HEADER: &str = "orderId";

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "orderId")]
    pub order_id: String,
}

impl From<&Order> for ExportRecord {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
        }
    }
}

/// Project orders to export rows, preserving order
pub fn extract_records(orders: &[Order]) -> Vec<ExportRecord> {
    orders.iter().map(ExportRecord::from).collect()
}

#[derive(Debug, Error)]
pub enum CsvError {
    /// Record `row` (0-based) has no identifier
    #[error("record {row} has no orderId")]
    MissingOrderId { row: usize },

    #[error("CSV write failed: {0}")]
    Write(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Render records as `orderId` CSV
///
/// Rows are `\n`-separated with no trailing newline, so an empty export is exactly
/// the header line.
pub fn to_csv(records: &[ExportRecord]) -> Result<String, CsvError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record([CSV_HEADER])?;
    for (row, record) in records.iter().enumerate() {
        if record.order_id.is_empty() {
            return Err(CsvError::MissingOrderId { row });
        }
        wtr.serialize(record)?;
    }

    let data = wtr.into_inner().map_err(|e| CsvError::Flush(e.to_string()))?;
    let mut text = String::from_utf8(data)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
