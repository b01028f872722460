//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rete_core::ReteError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
///
/// The message travels under `error`, the key the upload page reads.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    #[serde(rename = "error")]
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} non trovato"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Errore interno del server")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::internal_error().with_details(msg),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ReteError> for AppError {
    fn from(err: ReteError) -> Self {
        match err {
            ReteError::ValidationError(msg) => AppError::BadRequest(msg),
            ReteError::LlmError(msg) => AppError::Internal(format!("LLM error: {msg}")),
            ReteError::ExtractionError(msg) => {
                AppError::Internal(format!("Text extraction error: {msg}"))
            }
            ReteError::ExportError(msg) => AppError::Internal(format!("Report export error: {msg}")),
            ReteError::ConfigError(msg) => {
                AppError::Internal(format!("Configuration error: {msg}"))
            }
            ReteError::Io(err) => AppError::Internal(format!("IO error: {err}")),
            ReteError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialized_as_error() {
        let json = serde_json::to_value(ApiError::bad_request("Nessun file")).unwrap();
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["error"], "Nessun file");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_rete_error_mapping() {
        let err: AppError = ReteError::ValidationError("vuoto".to_string()).into();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "vuoto"));

        let err: AppError = ReteError::ExportError("disk full".to_string()).into();
        assert!(matches!(err, AppError::Internal(msg) if msg.contains("disk full")));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("report.csv".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
