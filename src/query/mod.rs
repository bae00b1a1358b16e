#![forbid(unsafe_code)]

//! Query-graph extraction and predicate reordering.
//!
//! This module turns one restricted-dialect query into its robustness
//! variants: parsing and conjunct splitting, classification into unary and
//! join predicates, cardinality-driven alias orderings, and padded variant
//! synthesis.

/// Scanner for the restricted dialect: alias bindings and conjunct
/// splitting.
pub mod parse;

/// Predicate classification into per-alias unary lists and join structure.
pub mod graph;

/// Cardinality-driven alias orderings.
pub mod order;

/// Variant synthesis: padding, reassembly, and the four-variant set.
pub mod synth;

pub use graph::{build_graph, QueryGraph};
pub use order::{plan_orders, OrderPlan};
pub use parse::{parse_query, split_conjuncts, ParsedQuery, TableRef};
pub use synth::{generate_variants, synthesize, VariantKind, VariantSet};
