//! Batch pipeline
//!
//! Drives one batch of uploaded reports through text extraction,
//! inference, interpretation, aggregation, deduplication and report
//! writing. Documents are processed one after the other; a document that
//! fails at any step contributes nothing and the batch carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rete_core::{LlmClient, ReteError, Result, StorageConfig};
use rete_parser::TextExtractor;
use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::dedup::{dedup_entities, dedup_relationships};
use crate::export::write_rows;
use crate::interpret::{interpret, Interpretation};
use crate::prompt::{build_prompt, STANDARD_QUESTION};
use crate::report::{build_profile_rows, build_rows};

/// An uploaded file
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Filename as sent by the client
    pub filename: String,
    pub data: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a local file
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(filename, data))
    }

    /// Only `.pdf` uploads are processed
    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf")
    }

    /// Identifier recorded as the source of every extracted record
    pub fn source_document(&self) -> String {
        rete_core::secure_filename(&self.filename)
    }
}

/// Pipeline settings, built once from `AppConfig`
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Staging directory for uploads during extraction
    pub upload_dir: PathBuf,
    /// Destination directory of the CSV reports
    pub report_dir: PathBuf,
    /// Instruction prepended to every document
    pub question: String,
}

impl PipelineConfig {
    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self {
            upload_dir: storage.upload_dir.clone(),
            report_dir: storage.report_dir.clone(),
            question: STANDARD_QUESTION.to_string(),
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }
}

/// Files produced by a successful batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub files_received: usize,
    pub report_filename: String,
    pub profile_filename: String,
    pub relationship_count: usize,
    pub entity_count: usize,
}

/// Result of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Valid run in which no document produced any record
    NothingExtracted { files_received: usize },
    Report(ReportSummary),
}

/// Batch driver
pub struct BatchPipeline {
    config: PipelineConfig,
    extractor: Arc<dyn TextExtractor>,
    llm: Arc<dyn LlmClient>,
}

impl BatchPipeline {
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn TextExtractor>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            extractor,
            llm,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a batch of uploads and write the reports
    pub async fn run(&self, uploads: Vec<DocumentUpload>) -> Result<BatchOutcome> {
        if uploads.is_empty() {
            return Err(ReteError::ValidationError("no files in request".to_string()));
        }

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        tokio::fs::create_dir_all(&self.config.report_dir).await?;

        let files_received = uploads.len();
        let mut aggregator = Aggregator::new();

        for upload in uploads {
            if !upload.is_pdf() {
                tracing::debug!(filename = %upload.filename, "Skipping non-PDF upload");
                continue;
            }

            let source = upload.source_document();
            if let Some(interpretation) = self.process_document(upload).await {
                aggregator.add(&source, interpretation);
            }
        }

        let aggregated = aggregator.finish();
        let entities = dedup_entities(aggregated.entities);
        let relationships = dedup_relationships(aggregated.relationships);

        tracing::info!(
            entities = entities.len(),
            relationships = relationships.len(),
            "Deduplication complete"
        );

        if entities.is_empty() && relationships.is_empty() {
            return Ok(BatchOutcome::NothingExtracted { files_received });
        }

        let stamp = chrono::Utc::now().timestamp();
        let report_filename = format!("report_{stamp}.csv");
        let profile_filename = format!("report_{stamp}_profili.csv");

        write_rows(
            &self.config.report_dir.join(&report_filename),
            &build_rows(&entities, &relationships),
        )?;
        write_rows(
            &self.config.report_dir.join(&profile_filename),
            &build_profile_rows(&entities, &relationships),
        )?;

        tracing::info!(report = %report_filename, "Report generated");

        Ok(BatchOutcome::Report(ReportSummary {
            files_received,
            report_filename,
            profile_filename,
            relationship_count: relationships.len(),
            entity_count: entities.len(),
        }))
    }

    /// Process local files, as the CLI does
    pub async fn run_paths(&self, paths: &[PathBuf]) -> Result<BatchOutcome> {
        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            uploads.push(DocumentUpload::from_path(path).await?);
        }
        self.run(uploads).await
    }

    async fn process_document(&self, upload: DocumentUpload) -> Option<Interpretation> {
        tracing::info!(filename = %upload.filename, bytes = upload.data.len(), "Processing document");

        let response = self.ask(upload).await?;
        Some(interpret(&response))
    }

    /// Stage the upload, extract its text and query the model.
    ///
    /// Staging and extraction run together on a blocking thread. The staged
    /// file lives exactly as long as this call.
    async fn ask(&self, upload: DocumentUpload) -> Option<String> {
        let DocumentUpload { filename, data } = upload;
        let extractor = Arc::clone(&self.extractor);
        let upload_dir = self.config.upload_dir.clone();

        let task = tokio::task::spawn_blocking(move || -> std::io::Result<_> {
            let staged = stage(&upload_dir, &data)?;
            let text = extractor.extract_text(staged.path());
            Ok((staged, text))
        });

        let (staged, text) = match task.await {
            Ok(Ok(extracted)) => extracted,
            Ok(Err(e)) => {
                tracing::warn!(filename = %filename, error = %e, "Failed to stage upload");
                return None;
            }
            Err(e) => {
                tracing::error!(filename = %filename, error = %e, "Text extraction task failed");
                return None;
            }
        };

        let Some(text) = text else {
            tracing::warn!(filename = %filename, "No text extracted, skipping document");
            return None;
        };

        let prompt = build_prompt(&self.config.question, &text);
        let response = self.llm.generate(&prompt).await;

        if let Err(e) = staged.close() {
            tracing::warn!(filename = %filename, error = %e, "Failed to remove staged upload");
        }

        match response {
            Ok(response) => {
                tracing::debug!(
                    filename = %filename,
                    model = self.llm.model(),
                    chars = response.len(),
                    "Model response received"
                );
                Some(response)
            }
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Inference failed, skipping document");
                None
            }
        }
    }
}

fn stage(upload_dir: &Path, data: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(".pdf")
        .tempfile_in(upload_dir)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}
