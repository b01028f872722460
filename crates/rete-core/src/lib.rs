//! rete Core - Shared error types, traits and configuration
//!
//! This crate defines the abstractions used throughout the rete workspace:
//! - Common error type and `Result` alias
//! - The `LlmClient` trait implemented by the inference clients
//! - Configuration management (environment, TOML file)
//! - Upload filename sanitising

pub mod config;

pub use config::{
    AppConfig, ConfigError, LlmConfig, LlmProvider, LoggingConfig, ServerConfig, StorageConfig,
};

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for rete operations
#[derive(Error, Debug)]
pub enum ReteError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Text extraction error: {0}")]
    ExtractionError(String),

    #[error("Report export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReteError>;

impl From<ConfigError> for ReteError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

// ============================================================================
// Filenames
// ============================================================================

/// Reduce an uploaded filename to a safe, flat ASCII form.
///
/// Accented letters are transliterated through NFKD (`città` → `citta`)
/// and other non-ASCII characters dropped. Path separators become word
/// breaks, whitespace runs collapse to `_`,
/// anything outside `[A-Za-z0-9._-]` is dropped and leading/trailing
/// `.`/`_` are stripped. The result never contains a directory component,
/// so it can be joined onto a storage directory directly. May be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename_plain() {
        assert_eq!(secure_filename("rapporto.pdf"), "rapporto.pdf");
        assert_eq!(secure_filename("My Report 2024.pdf"), "My_Report_2024.pdf");
    }

    #[test]
    fn test_secure_filename_strips_paths() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\docs\\nota.pdf"), "C_docs_nota.pdf");
    }

    #[test]
    fn test_secure_filename_transliterates_accents() {
        assert_eq!(secure_filename("città.pdf"), "citta.pdf");
        assert_eq!(secure_filename("Verbale n° 3 – Procura.pdf"), "Verbale_n_3_Procura.pdf");
        assert_eq!(secure_filename("日本.pdf"), "pdf");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ReteError = ConfigError::MissingRequired("MISTRAL_API_KEY".to_string()).into();
        assert!(matches!(err, ReteError::ConfigError(_)));
        assert!(err.to_string().contains("MISTRAL_API_KEY"));
    }

    struct Canned(&'static str);

    #[async_trait::async_trait]
    impl LlmClient for Canned {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.is_empty() {
                return Err(ReteError::LlmError("empty prompt".to_string()));
            }
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_llm_client_as_trait_object() {
        let client: std::sync::Arc<dyn LlmClient> = std::sync::Arc::new(Canned("[]"));
        assert_eq!(client.model(), "canned");
        assert_eq!(tokio_test::block_on(client.generate("Estrai")).unwrap(), "[]");
        assert!(matches!(
            tokio_test::block_on(client.generate("")),
            Err(ReteError::LlmError(_))
        ));
    }
}
