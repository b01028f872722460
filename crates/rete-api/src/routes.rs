//! API route definitions

use crate::handlers::{download, health, process};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Routes served to the upload page
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/process_files", post(process::process_files))
        .route("/download_csv/:filename", get(download::download_csv))
}
