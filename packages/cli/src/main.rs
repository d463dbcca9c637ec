#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for sale-object specification extraction.
//!
//! Uses `indicatif-log-bridge` (via [`maegak_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and the batch progress bar never fight for the terminal.

mod batch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use maegak_cli_utils::{IndicatifProgress, format_elapsed};
use maegak_pdf::{ExtractConfig, Extractor, process_path};

#[derive(Parser)]
#[command(name = "maegak", about = "Court-auction sale-object specification extractor")]
struct Cli {
    /// Extraction configuration (TOML). Defaults to the built-in one.
    #[arg(long, global = true, env = "MAEGAK_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one document and print its result as JSON
    Parse {
        /// A `.pdf` or a `.json` layout dump
        path: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Extract every matching document under a folder
    Batch {
        /// Folder to scan (its direct sub-folders are scanned too)
        dir: PathBuf,
        /// File name suffix selecting the documents
        #[arg(long, default_value = "_1.pdf")]
        suffix: String,
        /// Documents extracted at the same time
        #[arg(long, default_value_t = 4)]
        jobs: usize,
        /// Folder receiving one JSON file per document
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Error log (defaults to `<output-dir>/error_<folder name>.txt`)
        #[arg(long)]
        error_log: Option<PathBuf>,
    },
    /// List the configured occupant row layouts
    Layouts,
}

fn load_config(path: Option<&Path>) -> Result<ExtractConfig, maegak_pdf::ExtractError> {
    match path {
        Some(path) => ExtractConfig::from_path(path),
        None => ExtractConfig::embedded(),
    }
}

fn default_error_log(dir: &Path, output_dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map_or_else(|| "batch".to_owned(), |n| n.to_string_lossy().into_owned());
    output_dir.join(format!("error_{name}.txt"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = maegak_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { path, pretty } => {
            let extractor = Extractor::new(config);
            let result = process_path(&extractor, &path);
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
        Commands::Batch {
            dir,
            suffix,
            jobs,
            output_dir,
            error_log,
        } => {
            let error_log = error_log.unwrap_or_else(|| default_error_log(&dir, &output_dir));
            let options = batch::BatchOptions {
                dir,
                suffix,
                jobs,
                output_dir,
                error_log,
            };
            let progress = IndicatifProgress::batch_bar(&multi, "Collecting documents...");
            let summary = batch::run(Arc::new(Extractor::new(config)), &options, progress).await?;

            log::info!(
                "Processed {} documents ({} failed) in {}",
                summary.processed,
                summary.failed,
                format_elapsed(summary.elapsed)
            );
            if summary.failed > 0 {
                log::warn!("Failures were logged to {}", options.error_log.display());
            }
        }
        Commands::Layouts => {
            println!("{:<16} {:>5}  {:<6} CONTINUATION", "NAME", "CELLS", "STRIP");
            println!("{}", "-".repeat(44));
            for variant in config.layouts.variants() {
                println!(
                    "{:<16} {:>5}  {:<6} {}",
                    variant.name,
                    variant.cells,
                    if variant.strip_deposit_separators { "yes" } else { "no" },
                    if variant.continuation.is_some() { "yes" } else { "no" },
                );
            }
        }
    }

    Ok(())
}
