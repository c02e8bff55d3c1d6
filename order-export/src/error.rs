//! Export error and its HTTP mapping
//!
//! Each pipeline step has its own error; at the HTTP boundary they all become the
//! same 500 response. The cause is only written to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::export::{CsvError, ExportStage};
use crate::orders::OrderSourceError;
use crate::storage::StoreError;

/// Body returned for any failed export
pub const FAILURE_MESSAGE: &str =
    "Internal Server Error - Error processing orders and uploading to S3";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("fetching orders failed: {0}")]
    Fetch(#[from] OrderSourceError),

    #[error("serializing export failed: {0}")]
    Serialization(#[from] CsvError),

    #[error("uploading export failed: {0}")]
    Upload(#[from] StoreError),
}

impl ExportError {
    /// Stage the run was in when it failed
    pub fn stage(&self) -> ExportStage {
        match self {
            Self::Fetch(_) => ExportStage::Fetching,
            Self::Serialization(_) => ExportStage::Serializing,
            Self::Upload(_) => ExportStage::Uploading,
        }
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        tracing::error!(stage = %self.stage(), error = %self, "Order export failed");
        (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE).into_response()
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
