//! Tracing bootstrap shared by the CLI and tests.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, RewriteError};

/// Installs the global tracing subscriber.
///
/// `level` is the default filter directive; `RUST_LOG` overrides it when set.
/// Diagnostics go to stderr so CSV rows on stdout stay clean.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| RewriteError::InvalidArgument(format!("invalid log filter: {e}")))?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| RewriteError::InvalidArgument("logging already initialized".into()))
}
