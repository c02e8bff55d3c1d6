//! POST / — run today's export

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::ExportError;
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "CSV file uploaded successfully!";

pub async fn run_export(
    State(state): State<AppState>,
) -> Result<(StatusCode, &'static str), ExportError> {
    let report = state.pipeline.run().await?;

    tracing::info!(
        date = %report.date,
        bucket = %report.bucket,
        key = %report.key,
        upstream_total = report.upstream_total,
        exported = report.exported,
        "Daily order export uploaded"
    );

    Ok((StatusCode::OK, SUCCESS_MESSAGE))
}
