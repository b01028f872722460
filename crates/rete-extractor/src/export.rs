//! CSV sink
//!
//! Writes a fixed header followed by one line per row. The header is
//! written explicitly so an empty report still carries its columns.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use rete_core::ReteError;

/// Errors while writing a report
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ExportError> for ReteError {
    fn from(err: ExportError) -> Self {
        ReteError::ExportError(err.to_string())
    }
}

/// A row type with a fixed column order
///
/// `COLUMNS` must list the serialized field names in declaration order.
pub trait CsvRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Write `rows` to `path` as UTF-8, comma-delimited CSV
pub fn write_rows<R: CsvRow>(path: &Path, rows: &[R]) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(R::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush().map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}
