//! Crate-wide error and result types.

use std::io;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RewriteError>;

/// Errors raised while parsing queries, loading cardinalities, or rewriting.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// I/O failure reading a workload or writing variants.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The query text does not follow the restricted conjunctive dialect.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    /// A FROM alias has no entry in the query's cardinality map.
    #[error("no cardinality estimate for alias `{0}`")]
    MissingCardinality(String),
    /// An alias has neither unary predicates nor join columns to pad with.
    #[error("alias `{0}` has no predicates and no join columns")]
    DisconnectedAlias(String),
    /// The cardinality log is structurally invalid.
    #[error("invalid cardinality log (line {line}): {reason}")]
    CardLog {
        /// 1-based line number of the offending line.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// A caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
