//! Variant synthesis: padding, reassembly, and the four-variant set.

use rand::Rng;

use crate::cards::CardinalityMap;
use crate::error::{Result, RewriteError};
use crate::query::graph::{build_graph, QueryGraph};
use crate::query::order::plan_orders;
use crate::query::parse::{parse_query, ParsedQuery};

/// Duplicate predicates appended per padded alias.
pub const QUOTA_PER_ALIAS: usize = 5;

/// Padding ceiling per variant; once reached, later aliases contribute
/// their original predicate lists unchanged.
pub const TOTAL_PREDICATE_BUDGET: usize = 20;

/// The four workload variants generated for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    /// The input query text, byte for byte.
    Original,
    /// Aliases in increasing cardinality order.
    Increasing,
    /// Aliases in decreasing cardinality order.
    Decreasing,
    /// Aliases in a random order.
    Random,
}

impl VariantKind {
    /// Emission order of the variant directories.
    pub const ALL: [VariantKind; 4] = [
        VariantKind::Original,
        VariantKind::Increasing,
        VariantKind::Decreasing,
        VariantKind::Random,
    ];

    /// Output directory name for this variant.
    pub fn dir_name(self) -> &'static str {
        match self {
            VariantKind::Original => "original",
            VariantKind::Increasing => "increasing",
            VariantKind::Decreasing => "decreasing",
            VariantKind::Random => "random",
        }
    }
}

/// The rewritten query texts for one input query.
#[derive(Debug, Clone)]
pub struct VariantSet {
    /// Input text unchanged.
    pub original: String,
    /// Variant in increasing cardinality order.
    pub increasing: String,
    /// Variant in decreasing cardinality order.
    pub decreasing: String,
    /// Variant in random order.
    pub random: String,
}

impl VariantSet {
    /// The text of one variant.
    pub fn get(&self, kind: VariantKind) -> &str {
        match kind {
            VariantKind::Original => &self.original,
            VariantKind::Increasing => &self.increasing,
            VariantKind::Decreasing => &self.decreasing,
            VariantKind::Random => &self.random,
        }
    }
}

/// Synthesizes one reordered, padded variant of a parsed query.
///
/// Walks `ordering` and concatenates each alias's unary predicates. While
/// the padding budget lasts, an alias also gets [`QUOTA_PER_ALIAS`] extra
/// copies of its first unary predicate; an alias with none gets a
/// synthesized `alias.col >= 0` on its first join column before the copies
/// (six entries total). Each processed alias consumes [`QUOTA_PER_ALIAS`]
/// budget regardless of list size, so the first four aliases are padded.
/// Join predicates follow the unary block verbatim, in source order.
pub fn synthesize(
    parsed: &ParsedQuery,
    graph: &QueryGraph,
    ordering: &[String],
) -> Result<String> {
    let mut clauses: Vec<String> = Vec::new();
    let mut padded = 0usize;

    for alias in ordering {
        let base = graph.unary.get(alias).ok_or_else(|| {
            RewriteError::InvalidArgument(format!("ordering names unknown alias `{alias}`"))
        })?;
        let mut list = base.clone();
        if padded < TOTAL_PREDICATE_BUDGET {
            if list.is_empty() {
                let column = graph
                    .join_columns
                    .get(alias)
                    .and_then(|cols| cols.first())
                    .ok_or_else(|| RewriteError::DisconnectedAlias(alias.clone()))?;
                list.push(format!("{alias}.{column} >= 0"));
            }
            let first = list[0].clone();
            list.extend(std::iter::repeat(first).take(QUOTA_PER_ALIAS));
            padded += QUOTA_PER_ALIAS;
        }
        clauses.extend(list);
    }

    clauses.extend(graph.join_predicates.iter().cloned());
    Ok(format!(
        "{} WHERE {};",
        parsed.select_clause,
        clauses.join(" AND ")
    ))
}

/// Produces the four-variant set for one query text.
///
/// The original variant is `text` unchanged; the other three are
/// synthesized from fresh orderings planned against `cards`.
pub fn generate_variants<R: Rng + ?Sized>(
    text: &str,
    cards: &CardinalityMap,
    rng: &mut R,
) -> Result<VariantSet> {
    let parsed = parse_query(text)?;
    let graph = build_graph(&parsed)?;
    let plan = plan_orders(&graph.aliases, cards, rng)?;
    Ok(VariantSet {
        original: text.to_string(),
        increasing: synthesize(&parsed, &graph, &plan.increasing)?,
        decreasing: synthesize(&parsed, &graph, &plan.decreasing)?,
        random: synthesize(&parsed, &graph, &plan.random)?,
    })
}
