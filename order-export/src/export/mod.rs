//! Daily order export

mod pipeline;
mod records;
mod window;

pub use pipeline::{Clock, ExportPipeline, ExportReport, ExportStage};
pub use records::{CSV_HEADER, CsvError, ExportRecord, extract_records, to_csv};
pub use window::{DateWindow, FilterStrategy};
