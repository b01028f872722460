//! Application state management

use rete_core::config::AppConfig;
use rete_core::LlmClient;
use rete_extractor::{BatchPipeline, PipelineConfig};
use rete_parser::{PdfParser, TextExtractor};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Batch driver
    pub pipeline: BatchPipeline,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create state with the PDF parser and the given model client
    pub fn new(config: AppConfig, llm: Arc<dyn LlmClient>) -> Self {
        Self::with_extractor(config, Arc::new(PdfParser::new()), llm)
    }

    /// Create state with explicit collaborators
    pub fn with_extractor(
        config: AppConfig,
        extractor: Arc<dyn TextExtractor>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let pipeline =
            BatchPipeline::new(PipelineConfig::from_storage(&config.storage), extractor, llm);
        Self {
            config,
            pipeline,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Directory the generated reports are served from
    pub fn report_dir(&self) -> &PathBuf {
        &self.config.storage.report_dir
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
