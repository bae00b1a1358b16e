//! Workload rewriting and benchmarking toolkit for SQL query engines.
//!
//! Given a directory of conjunctive join queries and a cardinality log,
//! the rewrite pipeline emits four variants of each query (`original`,
//! `increasing`, `decreasing`, `random`) that differ only in predicate
//! order and padding. The harness half runs an engine command over query
//! files and scrapes timing rows out of its output.

#![warn(missing_docs)]

pub mod cards;
pub mod error;
pub mod harness;
pub mod logging;
pub mod query;
pub mod rewrite;

pub use error::{Result, RewriteError};
