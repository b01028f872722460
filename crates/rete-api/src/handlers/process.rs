//! Batch upload handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use rete_extractor::{BatchOutcome, DocumentUpload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart field carrying the reports, repeated once per file
pub const FILES_FIELD: &str = "pdf_files";

/// Warning returned when a batch produced no record
pub const NOTHING_EXTRACTED: &str = "Nessuna persona o relazione estratta";

/// Successful batch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessResponse {
    /// `"<n> file processati"`
    pub message: String,
    /// Primary report, downloadable from `/download_csv/{filename}`
    pub report_filename: String,
    /// Extended profile report
    pub profile_filename: String,
    /// Number of canonical relationships in the report
    pub num_relazioni_estratte: usize,
}

/// Batch that completed without extracting anything
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WarningsResponse {
    pub warnings: Vec<String>,
}

/// Process a batch of PDF reports
#[utoipa::path(
    post,
    path = "/process_files",
    tag = "reports",
    request_body(content = String, content_type = "multipart/form-data", description = "One or more `pdf_files` parts"),
    responses(
        (status = 200, description = "Reports generated; `WarningsResponse` when nothing was extracted", body = ProcessResponse),
        (status = 400, description = "No files in request", body = crate::error::ApiError),
        (status = 500, description = "Report could not be written", body = crate::error::ApiError)
    )
)]
pub async fn process_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    state.increment_requests();

    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Richiesta multipart non valida: {e}")))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Lettura di '{filename}' fallita: {e}")))?;
        uploads.push(DocumentUpload::new(filename, data.to_vec()));
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Nessun campo '{FILES_FIELD}' nella richiesta"
        )));
    }
    if uploads.iter().all(|u| u.filename.is_empty()) {
        return Err(AppError::BadRequest(
            "Nessun file selezionato per il caricamento".to_string(),
        ));
    }

    tracing::info!(files = uploads.len(), "Batch received");

    match state.pipeline.run(uploads).await? {
        BatchOutcome::NothingExtracted { files_received } => {
            tracing::warn!(files = files_received, "No entity or relationship extracted");
            Ok(Json(WarningsResponse {
                warnings: vec![NOTHING_EXTRACTED.to_string()],
            })
            .into_response())
        }
        BatchOutcome::Report(summary) => Ok(Json(ProcessResponse {
            message: format!("{} file processati", summary.files_received),
            report_filename: summary.report_filename,
            profile_filename: summary.profile_filename,
            num_relazioni_estratte: summary.relationship_count,
        })
        .into_response()),
    }
}
