//! docmeta CLI: document text extraction and metadata.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use docmeta::config::{DocmetaConfig, default_config_path};
use docmeta::error::{DocmetaError, DocmetaResult};
use docmeta::extract::error::ExtractError;
use docmeta::metadata::{MetadataRecord, MetadataReport, generate_metadata};
use docmeta::ocr::{self, OcrEngine};
use docmeta::upload::process_upload;

#[derive(Parser)]
#[command(name = "docmeta", version, about = "Document text extraction and metadata")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/docmeta/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document and print its metadata.
    Extract {
        /// Document to analyse (.pdf, .docx, .txt, .png, .jpg, .jpeg).
        path: PathBuf,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,

        /// Skip OCR even when tesseract is installed.
        #[arg(long)]
        no_ocr: bool,

        /// Maximum number of keywords.
        #[arg(long)]
        keywords: Option<usize>,

        /// Target number of summary sentences.
        #[arg(long)]
        sentences: Option<usize>,
    },

    /// Run a file through the upload path: allowlist, staging and cleanup.
    Upload {
        /// File to upload.
        path: PathBuf,
    },

    /// Report whether tesseract is available.
    OcrStatus,

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,

    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            path,
            json,
            no_ocr,
            keywords,
            sentences,
        } => {
            if let Some(n) = keywords {
                config.num_keywords = n;
            }
            if let Some(n) = sentences {
                config.summary_sentences = n;
            }
            let disabled;
            let engine = if no_ocr {
                disabled = OcrEngine::disabled();
                &disabled
            } else {
                ocr::install_global(&config.ocr)
            };

            let report = generate_metadata(&path, &config, engine);
            if json {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else {
                print_report(&report);
            }
        }

        Commands::Upload { path } => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = std::fs::read(&path)
                .map_err(ExtractError::from)
                .map_err(DocmetaError::from)?;
            let engine = ocr::install_global(&config.ocr);
            let outcome =
                process_upload(&filename, &bytes, &config, engine).map_err(DocmetaError::from)?;
            println!("{}", serde_json::to_string_pretty(&outcome).into_diagnostic()?);
        }

        Commands::OcrStatus => {
            let engine = ocr::install_global(&config.ocr);
            match engine.version() {
                Some(version) => {
                    println!("OCR available: {version}");
                    println!("  tesseract: {}", engine.config().tesseract_cmd);
                    println!("  pdftoppm:  {}", engine.config().pdftoppm_cmd);
                    println!(
                        "  dpi={} oem={} psm={} language={}",
                        engine.config().dpi,
                        engine.config().oem,
                        engine.config().psm,
                        engine.config().language.as_deref().unwrap_or("(default)")
                    );
                }
                None => println!("OCR not available - Tesseract not configured"),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config).into_diagnostic()?);
            }
            ConfigAction::Init { force } => {
                let Some(path) = cli.config.clone().or_else(default_config_path) else {
                    miette::bail!("cannot determine config location; pass --config");
                };
                if path.exists() && !force {
                    miette::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                DocmetaConfig::default()
                    .save(&path)
                    .map_err(DocmetaError::from)?;
                println!("Wrote default config to {}", path.display());
            }
        },
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> DocmetaResult<DocmetaConfig> {
    Ok(DocmetaConfig::resolve(explicit)?)
}

fn print_report(report: &MetadataReport) {
    match report {
        MetadataReport::Complete(record) => print_record(record),
        MetadataReport::Error(error) => println!("Error: {}", error.error),
    }
    print_log(report.extraction_log());
    if let Some(record) = report.record() {
        println!("\nPreview:\n{}", record.text_preview);
    }
}

fn print_record(record: &MetadataRecord) {
    println!("File:          {}", record.file_name);
    println!("Type:          {}", record.file_type);
    println!("Size:          {}", record.file_size);
    println!("Created:       {}", record.creation_date);
    println!("Modified:      {}", record.modification_date);
    println!(
        "Counts:        {} words, {} characters, {} lines",
        record.word_count, record.character_count, record.line_count
    );
    println!("Content type:  {}", record.content_type);
    println!("Status:        {:?}", record.extraction_status);
    if record.keywords.is_empty() {
        println!("Keywords:      (none)");
    } else {
        println!("Keywords:      {}", record.keywords.join(", "));
    }
    println!("\nSummary:\n  {}", record.summary);
}

fn print_log(log: &[String]) {
    println!("\nExtraction log:");
    for entry in log {
        println!("  - {entry}");
    }
}
