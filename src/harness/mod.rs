#![forbid(unsafe_code)]

//! Thin benchmarking harness.
//!
//! Runs an external engine command over a directory of `.sql` files,
//! scrapes whitespace-separated timing values from the captured stream,
//! and emits `label,benchmark,query_id,value` rows as CSV. The harness
//! knows nothing about the rewrite pipeline; it only consumes query files
//! and a command line.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// External process execution and timing scrapes.
pub mod process;

/// Timing row emission as CSV.
pub mod report;

use report::{RowWriter, TimingRow};

/// Error type for harness operations.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error from process or file operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// CSV writing error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<&str> for HarnessError {
    fn from(value: &str) -> Self {
        HarnessError::Message(value.to_string())
    }
}

/// Which captured stream carries the engine's timing output.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum TimeSource {
    /// Scrape stderr. Engines commonly keep stdout for result rows.
    #[default]
    Stderr,
    /// Scrape stdout.
    Stdout,
}

/// Configuration for one harness run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Label recorded in the first CSV column.
    pub label: String,
    /// Benchmark family recorded in the second CSV column.
    pub benchmark: String,
    /// Directory containing `.sql` query files.
    pub queries_dir: PathBuf,
    /// Command and arguments; `{query}` expands to the query file path and
    /// the path is appended when no argument mentions it.
    pub command: Vec<String>,
    /// Stream to scrape for timing values.
    pub time_source: TimeSource,
    /// Times each query command is launched. Zero is clamped to one run.
    pub runs: usize,
}

/// Summary statistics from a harness run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BenchSummary {
    /// Query files visited.
    pub queries_run: u64,
    /// Timing rows emitted.
    pub rows_emitted: u64,
    /// Launch failures plus non-zero exits.
    pub failures: u64,
}

/// Runs the configured command over every query file, emitting one row per
/// scraped timing value.
///
/// Query files are visited in ascending file-name order. A non-zero exit
/// is a warning, not an abort: whatever the engine printed before failing
/// is still scraped. A spawn failure skips the remaining runs of that
/// query and the harness moves on.
pub fn run_bench<W: Write>(
    cfg: &BenchConfig,
    writer: &mut RowWriter<W>,
) -> Result<BenchSummary, HarnessError> {
    let (program, args) = cfg.command.split_first().ok_or("bench command is empty")?;

    let mut files = Vec::new();
    for entry in fs::read_dir(&cfg.queries_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("sql") {
            files.push(path);
        }
    }
    files.sort();

    let runs = cfg.runs.max(1);
    let mut summary = BenchSummary::default();
    for path in &files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        summary.queries_run += 1;
        let run_args = substitute_query(args, path);

        for _ in 0..runs {
            let captured = match process::run_command(program, &run_args) {
                Ok(captured) => captured,
                Err(err) => {
                    error!(query = %stem, error = %err, "bench.spawn.failed");
                    summary.failures += 1;
                    break;
                }
            };
            if !captured.status.success() {
                warn!(query = %stem, status = %captured.status, "bench.run.nonzero_exit");
                summary.failures += 1;
            }
            let stream = match cfg.time_source {
                TimeSource::Stderr => &captured.stderr,
                TimeSource::Stdout => &captured.stdout,
            };
            for value in process::parse_times(stream) {
                writer.write_row(&TimingRow {
                    label: cfg.label.clone(),
                    benchmark: cfg.benchmark.clone(),
                    query_id: stem.to_string(),
                    value,
                })?;
                summary.rows_emitted += 1;
            }
        }
    }
    writer.flush()?;

    info!(
        queries_run = summary.queries_run,
        rows_emitted = summary.rows_emitted,
        failures = summary.failures,
        "bench.completed"
    );
    Ok(summary)
}

/// Expands `{query}` placeholders in `args`; appends the path when no
/// argument contains one.
fn substitute_query(args: &[String], query: &Path) -> Vec<String> {
    let path = query.display().to_string();
    let mut substituted = false;
    let mut out: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.contains("{query}") {
                substituted = true;
                arg.replace("{query}", &path)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        out.push(path);
    }
    out
}
