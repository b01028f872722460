//! rete CLI - Command-line interface
//!
//! Usage:
//!   rete process <PDF>... [--output-dir DIR]
//!   rete interpret <FILE>

use anyhow::Context;
use clap::{Parser, Subcommand};
use rete_core::config::AppConfig;
use rete_extractor::{interpret, BatchOutcome, BatchPipeline, PipelineConfig};
use rete_llm::create_llm_client;
use rete_parser::PdfParser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rete")]
#[command(about = "Entity and relationship reports from analyst PDFs")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables still take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of PDF reports through the model and write the CSV reports
    Process {
        /// PDF files to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory for the generated reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Interpret a saved model response and print the records as JSON
    Interpret {
        /// File holding the raw model output
        file: PathBuf,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rete=info,rete_extractor=info,rete_llm=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process { paths, output_dir } => {
            let mut config = load_config(cli.config)?;
            if let Some(dir) = output_dir {
                config.storage.report_dir = dir;
            }
            config.validate()?;

            let llm = create_llm_client(&config.llm)?;
            tracing::info!(files = paths.len(), model = llm.model(), "Processing batch");
            let pipeline = BatchPipeline::new(
                PipelineConfig::from_storage(&config.storage),
                Arc::new(PdfParser::new()),
                llm,
            );

            match pipeline.run_paths(&paths).await? {
                BatchOutcome::NothingExtracted { files_received } => {
                    println!("{files_received} file processati");
                    println!("Nessuna persona o relazione estratta");
                }
                BatchOutcome::Report(summary) => {
                    let dir = &config.storage.report_dir;
                    println!("{} file processati", summary.files_received);
                    println!("Entità: {}", summary.entity_count);
                    println!("Relazioni: {}", summary.relationship_count);
                    println!("Report: {}", dir.join(&summary.report_filename).display());
                    println!("Profili: {}", dir.join(&summary.profile_filename).display());
                }
            }
        }
        Commands::Interpret { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let interpretation = interpret(&raw);
            println!("{}", serde_json::to_string_pretty(&interpretation)?);
        }
    }

    Ok(())
}
