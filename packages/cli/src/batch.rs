//! Batch extraction over a folder tree.
//!
//! Documents are collected from the input folder and its direct
//! sub-folders, extracted concurrently (one blocking task per document) and
//! written as `<name>.json` under the output folder. Failures are appended
//! to a timestamped error log.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt as _};
use maegak_cli_utils::ProgressCallback;
use maegak_pdf::{Extractor, process_path};
use maegak_pdf_models::ParseResult;

/// Errors that abort a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The input folder could not be listed or the output folder created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Folder to scan.
    pub dir: PathBuf,
    /// File name suffix selecting the documents (case-insensitive).
    pub suffix: String,
    /// Documents extracted at the same time.
    pub jobs: usize,
    /// Folder receiving the JSON outputs.
    pub output_dir: PathBuf,
    /// File failures are appended to.
    pub error_log: PathBuf,
}

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents attempted.
    pub processed: usize,
    /// Documents that did not complete successfully.
    pub failed: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

fn matching_files(dir: &Path, suffix: &str) -> std::io::Result<Vec<PathBuf>> {
    let suffix = suffix.to_lowercase();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase().ends_with(&suffix));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    Ok(files)
}

/// Lists matching documents in `dir` and in each of its direct
/// sub-folders, sorted by path.
///
/// # Errors
///
/// Returns an error if `dir` cannot be read. Unreadable sub-folders are
/// logged and skipped.
pub fn collect_inputs(dir: &Path, suffix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut inputs = matching_files(dir, suffix)?;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        match matching_files(&path, suffix) {
            Ok(files) => {
                log::debug!("{}: {} matching files", path.display(), files.len());
                inputs.extend(files);
            }
            Err(e) => log::warn!("Skipping {}: {e}", path.display()),
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Where the JSON output for `input` goes: the input's path relative to
/// `dir`, re-rooted at `output_dir`, with a `.json` extension.
#[must_use]
pub fn output_path(dir: &Path, output_dir: &Path, input: &Path) -> PathBuf {
    let relative = input
        .strip_prefix(dir)
        .ok()
        .map(Path::to_path_buf)
        .or_else(|| input.file_name().map(PathBuf::from))
        .unwrap_or_default();
    output_dir.join(relative).with_extension("json")
}

/// Formats one error log entry.
#[must_use]
pub fn error_log_entry(timestamp: &str, input: &Path, message: &str) -> String {
    format!(
        "[{timestamp}] File: {}\nError: {message}\n{}\n",
        input.display(),
        "-".repeat(50)
    )
}

fn append_error(log_path: &Path, input: &Path, message: &str) -> std::io::Result<()> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    file.write_all(error_log_entry(&timestamp, input, message).as_bytes())
}

fn write_result(path: &Path, result: &ParseResult) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(result).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| e.to_string())
}

/// Extracts every matching document under `options.dir`.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the input folder cannot be listed or the
/// output folder cannot be created. Per-document failures are counted and
/// logged, never returned.
pub async fn run(
    extractor: Arc<Extractor>,
    options: &BatchOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<BatchSummary, BatchError> {
    let start = Instant::now();

    let inputs = collect_inputs(&options.dir, &options.suffix)?;
    std::fs::create_dir_all(&options.output_dir)?;
    if let Some(parent) = options.error_log.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::info!(
        "Extracting {} documents from {} (jobs={})",
        inputs.len(),
        options.dir.display(),
        options.jobs
    );
    progress.set_total(inputs.len() as u64);

    let outcomes: Vec<(PathBuf, Result<(), String>)> =
        stream::iter(inputs.into_iter().map(|input| {
            let extractor = Arc::clone(&extractor);
            let progress = Arc::clone(&progress);
            let output = output_path(&options.dir, &options.output_dir, &input);
            async move {
                let path = input.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    let result = process_path(&extractor, &path);
                    write_result(&output, &result)?;
                    if result.is_success() {
                        Ok(())
                    } else {
                        Err(format!(
                            "{} {}: {}",
                            result.result_code.value(),
                            result.result_code,
                            result.result_msg
                        ))
                    }
                })
                .await;

                if let Some(name) = input.file_name() {
                    progress.set_message(name.to_string_lossy().into_owned());
                }
                progress.inc(1);

                let outcome = joined.unwrap_or_else(|e| Err(format!("extraction task failed: {e}")));
                (input, outcome)
            }
        }))
        .buffer_unordered(options.jobs.max(1))
        .collect()
        .await;

    let mut failed = 0;
    for (input, outcome) in &outcomes {
        if let Err(message) = outcome {
            failed += 1;
            log::warn!("{}: {message}", input.display());
            if let Err(e) = append_error(&options.error_log, input, message) {
                log::error!("Could not write {}: {e}", options.error_log.display());
            }
        }
    }

    let summary = BatchSummary {
        processed: outcomes.len(),
        failed,
        elapsed: start.elapsed(),
    };
    progress.finish(format!(
        "{} documents, {} failed",
        summary.processed, summary.failed
    ));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use maegak_cli_utils::null_progress;
    use maegak_pdf::ExtractConfig;

    use super::*;

    const LAYOUT: &str = r#"{"pages":[{"tables":[[["사건","","2025타경100211","","","","","","",""]]],"text":"1회 2025.07.01 100,000,000 10,000,000"}]}"#;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("maegak_batch_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn collects_top_level_and_sub_folder_files() {
        let dir = scratch("collect");
        std::fs::create_dir_all(dir.join("a/deeper")).unwrap();
        std::fs::write(dir.join("1010_1.PDF"), "").unwrap();
        std::fs::write(dir.join("1010_2.pdf"), "").unwrap();
        std::fs::write(dir.join("a/2020_1.pdf"), "").unwrap();
        std::fs::write(dir.join("a/deeper/3030_1.pdf"), "").unwrap();

        let inputs = collect_inputs(&dir, "_1.pdf").unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(inputs, vec![dir.join("1010_1.PDF"), dir.join("a/2020_1.pdf")]);
    }

    #[test]
    fn output_mirrors_input_layout() {
        assert_eq!(
            output_path(Path::new("/in"), Path::new("/out"), Path::new("/in/a/2020_1.pdf")),
            PathBuf::from("/out/a/2020_1.json")
        );
        assert_eq!(
            output_path(Path::new("/in"), Path::new("/out"), Path::new("/elsewhere/x_1.pdf")),
            PathBuf::from("/out/x_1.json")
        );
    }

    #[test]
    fn formats_error_entry() {
        assert_eq!(
            error_log_entry("2026-01-02 03:04:05", Path::new("a/b_1.pdf"), "999 boom"),
            format!("[2026-01-02 03:04:05] File: a/b_1.pdf\nError: 999 boom\n{}\n", "-".repeat(50))
        );
    }

    #[tokio::test]
    async fn runs_batch_and_logs_failures() {
        let dir = scratch("run");
        std::fs::create_dir_all(dir.join("in/sub")).unwrap();
        std::fs::write(dir.join("in/good_1.json"), LAYOUT).unwrap();
        std::fs::write(dir.join("in/sub/bad_1.json"), "{").unwrap();

        let options = BatchOptions {
            dir: dir.join("in"),
            suffix: "_1.json".to_owned(),
            jobs: 2,
            output_dir: dir.join("out"),
            error_log: dir.join("out/error_in.txt"),
        };
        let extractor = Arc::new(Extractor::new(ExtractConfig::embedded().unwrap()));
        let summary = run(extractor, &options, null_progress()).await.unwrap();

        let good = std::fs::read_to_string(dir.join("out/good_1.json")).unwrap();
        let bad = std::fs::read_to_string(dir.join("out/sub/bad_1.json")).unwrap();
        let log = std::fs::read_to_string(&options.error_log).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert!(good.contains("2025타경100211"));
        assert!(bad.contains("999"));
        assert!(log.contains("bad_1.json"));
        assert!(log.contains("Error: 999 UNEXPECTED_ERROR: "));
        assert!(!log.contains("good_1.json"));
    }
}
