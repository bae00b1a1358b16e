//! External engine processes and timing scrapes.

use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::harness::HarnessError;

/// Captured output of one external command run.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit status reported by the OS.
    pub status: ExitStatus,
    /// Stdout, decoded lossily.
    pub stdout: String,
    /// Stderr, decoded lossily.
    pub stderr: String,
}

/// Runs `program` with `args` to completion, capturing both streams.
pub fn run_command(program: &str, args: &[String]) -> Result<CapturedOutput, HarnessError> {
    debug!(%program, ?args, "bench.exec");
    let output = Command::new(program).args(args).output()?;
    Ok(CapturedOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Extracts every whitespace-separated token of `text` that parses as a
/// float, in order. Everything else is dropped silently; engines mix
/// timing lines with other chatter.
pub fn parse_times(text: &str) -> Vec<f64> {
    text.split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .collect()
}
