//! Scanner for the restricted conjunctive dialect.
//!
//! Queries look like `SELECT ... FROM t1 AS a1, t2 AS a2 WHERE p1 AND p2;`
//! with uppercase keywords and a conjunction-only WHERE clause. The scanner
//! tracks parenthesis depth and single-quoted string literals in a single
//! left-to-right pass, so splitting never fires inside a group or a literal.

use std::collections::HashSet;

use crate::error::{Result, RewriteError};

/// One `table AS alias` binding from the FROM list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Base table name as written.
    pub table: String,
    /// Alias the predicates refer to.
    pub alias: String,
}

/// A query decomposed into its reassembly ingredients.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// Everything before `WHERE`, trimmed. Includes the FROM list.
    pub select_clause: String,
    /// FROM bindings in appearance order; duplicate aliases keep the first.
    pub tables: Vec<TableRef>,
    /// Deduplicated conjuncts in first-occurrence order.
    pub predicates: Vec<String>,
}

const KW_FROM: &[u8] = b"FROM";
const KW_WHERE: &[u8] = b"WHERE";
const KW_AND: &[u8] = b"AND";
const KW_BETWEEN: &[u8] = b"BETWEEN";

/// Word constituent for identifiers and keyword boundaries. Multi-byte
/// UTF-8 units count as word bytes so literals never fake a boundary.
pub(crate) fn is_word_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric() || b >= 0x80
}

/// Strict ASCII identifier byte, the alphabet of aliases and columns.
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Advances past a single-quoted literal starting at `start` (the opening
/// quote). Doubled quotes stay inside the literal. An unterminated literal
/// runs to the end of the input.
pub(crate) fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// True when `word` occurs at `pos` as a standalone word.
fn keyword_at(bytes: &[u8], pos: usize, word: &[u8]) -> bool {
    if pos + word.len() > bytes.len() || &bytes[pos..pos + word.len()] != word {
        return false;
    }
    if pos > 0 && is_word_byte(bytes[pos - 1]) {
        return false;
    }
    match bytes.get(pos + word.len()) {
        Some(&next) => !is_word_byte(next),
        None => true,
    }
}

/// Byte offset of the first standalone `word` at parenthesis depth zero
/// and outside string literals.
fn find_keyword(text: &str, word: &[u8]) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_string(bytes, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
            }
            _ => {
                if depth == 0 && keyword_at(bytes, i, word) {
                    return Some(i);
                }
                i += 1;
            }
        }
    }
    None
}

/// Splits `text` on commas at parenthesis depth zero, outside literals.
fn split_top_level_commas(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_string(bytes, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
            }
            b',' if depth == 0 => {
                parts.push(&text[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Splits a WHERE body into top-level conjuncts.
///
/// `AND` separates conjuncts only at parenthesis depth zero and outside
/// string literals. A top-level `BETWEEN` claims the next top-level `AND`
/// as its range separator, keeping `x BETWEEN lo AND hi` atomic. Depth is
/// signed, so input left unbalanced by a stray `(` or a stray `)` runs to
/// the end as one trailing conjunct from the point balance was lost.
///
/// Conjuncts are returned raw; callers trim. The result always has at
/// least one element.
pub fn split_conjuncts(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut pending_between = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_string(bytes, i),
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
            }
            _ if depth == 0 && keyword_at(bytes, i, KW_BETWEEN) => {
                pending_between = true;
                i += KW_BETWEEN.len();
            }
            _ if depth == 0 && keyword_at(bytes, i, KW_AND) => {
                if pending_between {
                    // Range separator, not a conjunction.
                    pending_between = false;
                } else {
                    parts.push(&body[start..i]);
                    start = i + KW_AND.len();
                }
                i += KW_AND.len();
            }
            _ => i += 1,
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Parses a full query into select clause, alias bindings, and conjuncts.
///
/// The first top-level `WHERE` ends the select clause; the FROM list sits
/// between the first top-level `FROM` and that `WHERE`. One trailing `;`
/// after the WHERE body is stripped before splitting.
pub fn parse_query(text: &str) -> Result<ParsedQuery> {
    let where_pos = find_keyword(text, KW_WHERE)
        .ok_or_else(|| RewriteError::MalformedQuery("query has no WHERE clause".into()))?;
    let head = &text[..where_pos];
    let from_pos = find_keyword(head, KW_FROM)
        .ok_or_else(|| RewriteError::MalformedQuery("query has no FROM clause".into()))?;

    let select_clause = head.trim().to_string();
    let tables = parse_from_list(&head[from_pos + KW_FROM.len()..])?;

    let body = text[where_pos + KW_WHERE.len()..].trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    if body.is_empty() {
        return Err(RewriteError::MalformedQuery("WHERE clause is empty".into()));
    }

    let mut predicates = Vec::new();
    let mut seen = HashSet::new();
    for part in split_conjuncts(body) {
        let pred = part.trim();
        if pred.is_empty() {
            return Err(RewriteError::MalformedQuery(
                "empty predicate in WHERE clause".into(),
            ));
        }
        if seen.insert(pred) {
            predicates.push(pred.to_string());
        }
    }

    Ok(ParsedQuery {
        select_clause,
        tables,
        predicates,
    })
}

fn parse_from_list(list: &str) -> Result<Vec<TableRef>> {
    let mut tables = Vec::new();
    let mut seen = HashSet::new();
    for item in split_top_level_commas(list) {
        let trimmed = item.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens.as_slice() {
            [table, "AS", alias] if is_word(alias) => {
                if seen.insert(alias.to_string()) {
                    tables.push(TableRef {
                        table: table.to_string(),
                        alias: alias.to_string(),
                    });
                }
            }
            _ => {
                return Err(RewriteError::MalformedQuery(format!(
                    "malformed FROM item `{trimmed}`"
                )));
            }
        }
    }
    if tables.is_empty() {
        return Err(RewriteError::MalformedQuery(
            "FROM clause lists no table aliases".into(),
        ));
    }
    Ok(tables)
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_ident_byte)
}
