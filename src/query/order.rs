//! Cardinality-driven alias orderings.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::CardinalityMap;
use crate::error::{Result, RewriteError};

/// The three alias orderings behind the synthesized variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// Aliases sorted by estimated cardinality, smallest first.
    pub increasing: Vec<String>,
    /// Aliases sorted by estimated cardinality, largest first.
    pub decreasing: Vec<String>,
    /// A uniform random permutation of the aliases.
    pub random: Vec<String>,
}

/// Plans the three orderings for `aliases`.
///
/// Both sorts are stable: aliases with equal cardinalities keep their FROM
/// appearance order in the increasing and the decreasing ordering alike.
/// An alias missing from `cards` fails the whole plan, which cancels every
/// variant of the query.
pub fn plan_orders<R: Rng + ?Sized>(
    aliases: &[String],
    cards: &CardinalityMap,
    rng: &mut R,
) -> Result<OrderPlan> {
    for alias in aliases {
        if !cards.contains_key(alias) {
            return Err(RewriteError::MissingCardinality(alias.clone()));
        }
    }

    let mut increasing = aliases.to_vec();
    increasing.sort_by_key(|alias| cards[alias]);

    // Reversed comparator, not sort-then-reverse: ties keep appearance order.
    let mut decreasing = aliases.to_vec();
    decreasing.sort_by(|a, b| cards[b].cmp(&cards[a]));

    let mut random = aliases.to_vec();
    random.shuffle(rng);

    Ok(OrderPlan {
        increasing,
        decreasing,
        random,
    })
}
