//! Predicate classification into per-alias unary lists and join structure.

use std::collections::HashMap;

use crate::error::{Result, RewriteError};
use crate::query::parse::{is_ident_byte, skip_string, ParsedQuery};

/// Join and filter structure extracted from one parsed query.
///
/// Every predicate of the parsed query lands in exactly one place: the
/// per-alias `unary` lists or the `join_predicates` list. All per-alias
/// collections are insertion-ordered, so "first join column" and "first
/// unary predicate" are deterministic source-order notions.
#[derive(Debug, Clone)]
pub struct QueryGraph {
    /// Aliases in FROM appearance order.
    pub aliases: Vec<String>,
    /// Unary predicates filed under the first alias they reference.
    pub unary: HashMap<String, Vec<String>>,
    /// Neighbor aliases reachable through join predicates, deduplicated.
    pub neighbors: HashMap<String, Vec<String>>,
    /// Columns of each alias that appear in join predicates, deduplicated.
    pub join_columns: HashMap<String, Vec<String>>,
    /// Join predicates verbatim, in source order.
    pub join_predicates: Vec<String>,
}

/// An `alias.column` reference inside a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DottedRef<'a> {
    alias: &'a str,
    column: &'a str,
}

/// Classifies the parsed predicates into a [`QueryGraph`].
///
/// A predicate is a join predicate iff its entire text has the shape
/// `alias.column = alias.column` (whitespace allowed around `=` only).
/// Everything else is unary and is filed under the first `alias.column`
/// reference outside string literals. Unknown aliases and predicates with
/// no alias reference are malformed-query errors.
pub fn build_graph(parsed: &ParsedQuery) -> Result<QueryGraph> {
    let aliases: Vec<String> = parsed.tables.iter().map(|t| t.alias.clone()).collect();
    let mut graph = QueryGraph {
        unary: aliases.iter().map(|a| (a.clone(), Vec::new())).collect(),
        neighbors: aliases.iter().map(|a| (a.clone(), Vec::new())).collect(),
        join_columns: aliases.iter().map(|a| (a.clone(), Vec::new())).collect(),
        join_predicates: Vec::new(),
        aliases,
    };

    for pred in &parsed.predicates {
        if let Some((left, right)) = as_join_shape(pred) {
            for side in [left, right] {
                if !graph.unary.contains_key(side.alias) {
                    return Err(RewriteError::MalformedQuery(format!(
                        "join predicate `{pred}` references unknown alias `{}`",
                        side.alias
                    )));
                }
            }
            push_alias_value(&mut graph.neighbors, left.alias, right.alias);
            push_alias_value(&mut graph.neighbors, right.alias, left.alias);
            push_alias_value(&mut graph.join_columns, left.alias, left.column);
            push_alias_value(&mut graph.join_columns, right.alias, right.column);
            graph.join_predicates.push(pred.clone());
        } else {
            let dotted = first_dotted_ref(pred).ok_or_else(|| {
                RewriteError::MalformedQuery(format!(
                    "predicate `{pred}` references no alias column"
                ))
            })?;
            let list = graph.unary.get_mut(dotted.alias).ok_or_else(|| {
                RewriteError::MalformedQuery(format!(
                    "predicate `{pred}` references unknown alias `{}`",
                    dotted.alias
                ))
            })?;
            list.push(pred.clone());
        }
    }

    Ok(graph)
}

// Both maps are pre-filled with every alias, so the lookup cannot miss.
fn push_alias_value(map: &mut HashMap<String, Vec<String>>, alias: &str, value: &str) {
    if let Some(list) = map.get_mut(alias) {
        push_unique(list, value);
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Splits `alias.column = alias.column` into its sides when the predicate
/// has exactly that shape.
fn as_join_shape(pred: &str) -> Option<(DottedRef<'_>, DottedRef<'_>)> {
    let (left, rest) = take_dotted(pred)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    let (right, rest) = take_dotted(rest.trim_start())?;
    if rest.is_empty() {
        Some((left, right))
    } else {
        None
    }
}

/// Consumes a leading `word.word` and returns it with the remaining text.
fn take_dotted(s: &str) -> Option<(DottedRef<'_>, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    if i == 0 || bytes.get(i) != Some(&b'.') {
        return None;
    }
    let alias_end = i;
    let col_start = i + 1;
    let mut j = col_start;
    while j < bytes.len() && is_ident_byte(bytes[j]) {
        j += 1;
    }
    if j == col_start {
        return None;
    }
    Some((
        DottedRef {
            alias: &s[..alias_end],
            column: &s[col_start..j],
        },
        &s[j..],
    ))
}

/// First `word.word` reference outside string literals, if any.
fn first_dotted_ref(pred: &str) -> Option<DottedRef<'_>> {
    let bytes = pred.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_string(bytes, i),
            b if is_ident_byte(b) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                if bytes.get(i) == Some(&b'.') {
                    if let Some((dotted, _)) = take_dotted(&pred[start..]) {
                        return Some(dotted);
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    None
}
