//! order-export — daily order id export
//!
//! On `POST /` the service lists today's orders from the upstream order API,
//! keeps the ids of the orders belonging to the reporting day, renders them as a
//! one-column CSV and uploads it to S3 under a date-stamped key.
//!
//! ```text
//! order-export/src/
//! ├── api/       # HTTP routes
//! ├── export/    # day window, CSV rendering, pipeline
//! ├── orders/    # upstream order source
//! ├── storage/   # object store (S3)
//! ├── config.rs  # environment configuration
//! ├── error.rs   # export error → HTTP 500
//! └── state.rs   # shared application state
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod orders;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{ExportError, ExportResult};
pub use export::{ExportPipeline, ExportReport, FilterStrategy};
pub use state::AppState;
