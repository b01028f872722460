//! PDF document parser using pdf-extract
//!
//! Extracts the text content of multi-page PDF reports. Pages are
//! separated by form feeds in the extracted text.

use std::path::Path;

use crate::{DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// PDF document parser
pub struct PdfParser {
    /// Append a newline after each page break, so pages never run together
    pub separate_pages: bool,
}

impl PdfParser {
    /// Create a new PDF parser with default settings
    pub fn new() -> Self {
        Self {
            separate_pages: true,
        }
    }

    /// Toggle page separation
    pub fn with_page_separation(mut self, enabled: bool) -> Self {
        self.separate_pages = enabled;
        self
    }

    /// Extract text from PDF bytes
    pub fn extract_from_mem(&self, bytes: &[u8]) -> Result<(String, Option<u32>)> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        let page_count = estimate_page_count(&text);
        let text = if self.separate_pages {
            text.replace('\x0C', "\x0C\n")
        } else {
            text
        };

        Ok((text, page_count))
    }
}

/// Rough page count from form feed characters
fn estimate_page_count(text: &str) -> Option<u32> {
    let breaks = text.matches('\x0C').count() as u32;
    if breaks > 0 {
        Some(breaks + 1)
    } else {
        None
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let (text, page_count) = self.extract_from_mem(&bytes)?;

        let mut doc = ParsedDocument::new(path.display().to_string(), FileType::Pdf)
            .with_content(text);
        doc.page_count = page_count;

        Ok(doc)
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Pdf]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextExtractor;
    use std::io::Write;

    #[test]
    fn test_pdf_parser_creation() {
        let parser = PdfParser::new();
        assert!(parser.separate_pages);

        let parser = parser.with_page_separation(false);
        assert!(!parser.separate_pages);
    }

    #[test]
    fn test_page_count_estimate() {
        assert_eq!(estimate_page_count("una pagina"), None);
        assert_eq!(estimate_page_count("uno\x0Cdue\x0Ctre"), Some(3));
    }

    #[test]
    fn test_supported_types() {
        let parser = PdfParser::new();
        assert!(parser.can_parse(FileType::Pdf));
        assert!(!parser.can_parse(FileType::Unknown));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let parser = PdfParser::new();
        let err = parser.parse(Path::new("/nonexistent/report.pdf")).unwrap_err();
        assert!(matches!(err, ParserError::IoError { .. }));
    }

    #[test]
    fn test_garbage_bytes_yield_no_text() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"questo non e' un pdf").unwrap();

        let parser = PdfParser::new();
        assert!(parser.extract_text(file.path()).is_none());
    }
}
