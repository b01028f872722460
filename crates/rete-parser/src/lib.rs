//! rete Parser - Text extraction for analyst reports
//!
//! Reports arrive as PDF documents. Each parser implements the
//! `DocumentParser` trait and produces a `ParsedDocument`; the extraction
//! pipeline only needs the plain text, which it gets through the
//! infallible `TextExtractor` view every parser receives for free.

pub mod pdf;

pub use pdf::PdfParser;

use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during document parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Parsed Document Types
// ============================================================================

/// A parsed document with extracted content
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Original file path
    pub file_path: String,

    /// Detected file type
    pub file_type: FileType,

    /// Extracted text content, pages in document order
    pub content: String,

    /// Estimated page count
    pub page_count: Option<u32>,
}

impl ParsedDocument {
    /// Create a new parsed document
    pub fn new(file_path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_path: file_path.into(),
            file_type,
            content: String::new(),
            page_count: None,
        }
    }

    /// Set content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether the document yielded any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Get total character count
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Get MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parser Traits
// ============================================================================

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse a document from a file path
    fn parse(&self, path: &Path) -> Result<ParsedDocument>;

    /// Get supported file types
    fn supported_types(&self) -> &[FileType];

    /// Check if this parser can handle the given file type
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }
}

/// Text extraction as seen by the batch pipeline.
///
/// Never fails: parse errors are logged and reported as `None`, the same
/// as a document that contains no text at all.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Option<String>;
}

impl<P: DocumentParser> TextExtractor for P {
    fn extract_text(&self, path: &Path) -> Option<String> {
        let doc = match self.parse(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Text extraction failed");
                return None;
            }
        };

        if !doc.has_text() {
            tracing::debug!(path = %path.display(), "No meaningful text extracted");
            return None;
        }

        tracing::debug!(
            path = %path.display(),
            chars = doc.char_count(),
            pages = ?doc.page_count,
            "Text extracted"
        );
        Some(doc.content)
    }
}

// ============================================================================
// Tests
// ============================================================================
