//! Report download handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use rete_core::secure_filename;
use std::io::ErrorKind;
use std::sync::Arc;

/// Download a generated report
#[utoipa::path(
    get,
    path = "/download_csv/{filename}",
    tag = "reports",
    params(
        ("filename" = String, Path, description = "Report filename as returned by /process_files")
    ),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 404, description = "No such report", body = crate::error::ApiError)
    )
)]
pub async fn download_csv(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    state.increment_requests();

    let safe = secure_filename(&filename);
    if safe.is_empty() {
        return Err(AppError::NotFound(filename));
    }

    let path = state.report_dir().join(&safe);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(AppError::NotFound(safe)),
        Err(e) => return Err(AppError::Internal(format!("{}: {e}", path.display()))),
    };

    tracing::debug!(file = %safe, bytes = bytes.len(), "Serving report");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{safe}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
