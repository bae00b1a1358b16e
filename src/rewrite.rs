//! Batch driver: rewrite a workload directory into the four variant
//! directories (`original`, `increasing`, `decreasing`, `random`).

use std::fs;
use std::path::PathBuf;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cards::CardinalityLog;
use crate::error::Result;
use crate::query::synth::{generate_variants, VariantKind};

/// Configuration for a batch rewrite run.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Directory containing the base `.sql` workload.
    pub queries_dir: PathBuf,
    /// Path to the cardinality log.
    pub cards_path: PathBuf,
    /// Output root; the four variant directories are created beneath it.
    pub out_dir: PathBuf,
}

/// Summary statistics from a batch rewrite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RewriteSummary {
    /// `.sql` files seen in the input directory.
    pub queries_seen: u64,
    /// Queries rewritten into all four variant directories.
    pub rewritten: u64,
    /// Queries skipped because the log has no entry for them.
    pub skipped_missing_cards: u64,
    /// Queries that failed to parse or plan.
    pub failed: u64,
}

/// Rewrites every query in the configured directory.
///
/// Queries are processed in ascending file-name order. A query whose file
/// name has no entry in the cardinality log is skipped with a diagnostic
/// carrying the raw query text; a query that fails to parse or plan is
/// counted and the batch continues. Either way no variant file is written
/// for that query. Unreadable inputs and unwritable outputs abort the run.
///
/// # Arguments
/// * `cfg` - Input workload, cardinality log, and output root
/// * `rng` - Randomness source for the random orderings
///
/// # Returns
/// A `RewriteSummary` with per-outcome counts.
pub fn run_rewrite<R: Rng + ?Sized>(cfg: &RewriteConfig, rng: &mut R) -> Result<RewriteSummary> {
    let log = CardinalityLog::load(&cfg.cards_path)?;
    debug!(entries = log.len(), "rewrite.cards.loaded");

    for kind in VariantKind::ALL {
        fs::create_dir_all(cfg.out_dir.join(kind.dir_name()))?;
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&cfg.queries_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("sql") {
            files.push(path);
        }
    }
    files.sort();

    let mut summary = RewriteSummary::default();
    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %path.display(), "rewrite.query.unreadable_name");
            continue;
        };
        summary.queries_seen += 1;

        let text = fs::read_to_string(path)?;
        let Some(cards) = log.get(name) else {
            warn!(file = %name, query = %text.trim(), "rewrite.cards.missing");
            summary.skipped_missing_cards += 1;
            continue;
        };

        match generate_variants(&text, cards, rng) {
            Ok(variants) => {
                for kind in VariantKind::ALL {
                    let out_path = cfg.out_dir.join(kind.dir_name()).join(name);
                    fs::write(&out_path, variants.get(kind))?;
                }
                debug!(file = %name, "rewrite.query.done");
                summary.rewritten += 1;
            }
            Err(err) => {
                error!(file = %name, error = %err, "rewrite.query.failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        queries_seen = summary.queries_seen,
        rewritten = summary.rewritten,
        skipped_missing_cards = summary.skipped_missing_cards,
        failed = summary.failed,
        "rewrite.batch.completed"
    );
    Ok(summary)
}
