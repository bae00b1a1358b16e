//! Cardinality log loading.
//!
//! The log is line-oriented. A line ending in `.sql` opens a block for that
//! query file; an `Alias: (a1, a2, ...)` line and a `Cards: (n1, n2, ...)`
//! line complete it. Lines outside blocks are ignored, and a repeated block
//! for the same file overwrites the earlier one.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, RewriteError};

/// Per-alias cardinality estimates for one query.
pub type CardinalityMap = HashMap<String, u64>;

/// Parsed cardinality log, keyed by query file name (e.g. `1a.sql`).
#[derive(Debug, Clone, Default)]
pub struct CardinalityLog {
    entries: HashMap<String, CardinalityMap>,
}

impl CardinalityLog {
    /// Reads and parses the log at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses log text. Structural problems fail loudly with the offending
    /// line number; the log is shared input for a whole batch.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries: HashMap<String, CardinalityMap> = HashMap::new();
        let mut current_file: Option<String> = None;
        let mut current_aliases: Option<Vec<String>> = None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim();
            if line.ends_with(".sql") {
                current_file = Some(line.to_string());
                current_aliases = None;
            } else if let Some(rest) = line.strip_prefix("Alias:") {
                if current_file.is_some() {
                    current_aliases = Some(paren_list(rest.trim(), lineno)?);
                }
            } else if let Some(rest) = line.strip_prefix("Cards:") {
                let Some(file) = current_file.take() else {
                    continue;
                };
                let Some(aliases) = current_aliases.take() else {
                    return Err(RewriteError::CardLog {
                        line: lineno,
                        reason: "Cards line before Alias line".into(),
                    });
                };
                let counts = paren_list(rest.trim(), lineno)?;
                if counts.len() != aliases.len() {
                    return Err(RewriteError::CardLog {
                        line: lineno,
                        reason: format!(
                            "{} aliases but {} cardinalities",
                            aliases.len(),
                            counts.len()
                        ),
                    });
                }
                let mut map = CardinalityMap::new();
                for (alias, count) in aliases.into_iter().zip(counts) {
                    let value = count.parse::<u64>().map_err(|_| RewriteError::CardLog {
                        line: lineno,
                        reason: format!("invalid cardinality `{count}`"),
                    })?;
                    map.insert(alias, value);
                }
                entries.insert(file, map);
            }
        }

        Ok(Self { entries })
    }

    /// Cardinalities for one query file name, if the log has an entry.
    pub fn get(&self, file_name: &str) -> Option<&CardinalityMap> {
        self.entries.get(file_name)
    }

    /// Number of query entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(file name, cardinality map)` pairs in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CardinalityMap)> {
        self.entries.iter()
    }
}

/// Parses `(item, item, ...)` into trimmed items.
fn paren_list(text: &str, lineno: usize) -> Result<Vec<String>> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| RewriteError::CardLog {
            line: lineno,
            reason: format!("expected parenthesized list, got `{text}`"),
        })?;
    Ok(inner
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
