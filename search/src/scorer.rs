//! UCB scoring of selection options.
//!
//! At a chemical, selection weighs descending into an explored reaction
//! against applying the best unexplored template. Both are scored as
//! `Q + w * U`; the ranking is a stable descending sort, so ties keep
//! insertion order (reactions in child order, then the template).

use retro_kernel::chem::template::TemplateId;

use crate::node::NodeId;

/// A move available at a chemical during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOption {
    /// Descend into an explored reaction child.
    Reaction(NodeId),
    /// Apply a template that has not been explored yet.
    Template(TemplateId),
}

/// An option with its UCB score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredOption {
    pub score: f64,
    pub option: SelectionOption,
}

/// UCB score of an explored reaction.
///
/// `template_probability` is the summed relevance of the reaction's
/// contributing templates at the product.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reaction_ucb(
    template_probability: f64,
    estimated_value: f64,
    product_visits: u64,
    reaction_visits: u64,
    exploration_weight: f64,
) -> f64 {
    let visits = reaction_visits.max(1) as f64;
    let q = template_probability * estimated_value / visits;
    let u = ((product_visits as f64).ln() / visits).sqrt();
    q + exploration_weight * u
}

/// UCB score of the most relevant unexplored template.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn template_ucb(relevance: f64, product_visits: u64, exploration_weight: f64) -> f64 {
    let u = (product_visits as f64).ln().sqrt();
    relevance + exploration_weight * u
}

/// Sort options from highest to lowest score, keeping insertion order on ties.
pub fn rank_options(options: &mut [ScoredOption]) {
    options.sort_by(|a, b| b.score.total_cmp(&a.score));
}
