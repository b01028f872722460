//! Test doubles for router-level tests
//!
//! Staged uploads are read back as plain text and the model echoes the
//! document text, so a test controls the "model response" through the
//! bytes it uploads.

use crate::state::AppState;
use axum::Router;
use rete_core::{AppConfig, LlmClient, ReteError, Result};
use rete_extractor::prompt::STANDARD_QUESTION;
use rete_parser::TextExtractor;
use std::path::Path;
use std::sync::Arc;

/// Reads the staged file as UTF-8
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path)
            .ok()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Answers with the document part of the prompt
///
/// Documents containing `LLM_FAILURE` make the call fail.
pub struct EchoLlm;

#[async_trait::async_trait]
impl LlmClient for EchoLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let text = prompt.strip_prefix(STANDARD_QUESTION).unwrap_or(prompt);
        if text.contains("LLM_FAILURE") {
            return Err(ReteError::LlmError("simulated failure".to_string()));
        }
        Ok(text.to_string())
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Configuration rooted in a scratch directory
pub fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.upload_dir = root.join("uploads");
    config.storage.report_dir = root.join("reports");
    config
}

/// Router wired to the test doubles, storing files under `root`
pub fn create_router_for_testing(root: &Path) -> Router {
    let state = AppState::with_extractor(
        test_config(root),
        Arc::new(PlainTextExtractor),
        Arc::new(EchoLlm),
    );
    crate::create_router(Arc::new(state))
}
