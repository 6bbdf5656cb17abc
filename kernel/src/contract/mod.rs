//! Collaborator contracts consumed by the search core.
//!
//! Every external service the planner talks to is a trait here. The search
//! crate receives implementations by reference at construction time; nothing
//! is resolved from ambient state.
//!
//! # Contract
//!
//! - Calls are synchronous and may block on I/O.
//! - Implementations must be deterministic for a given input if the caller
//!   expects reproducible trees.
//! - All traits are `Send + Sync` so a caller may share one instance across
//!   several planners.

pub mod ranking;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chem::template::{TemplateId, TemplateRecord};

/// Typed failure from a collaborator lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Template records were requested before the library was loaded.
    #[error("template library is not loaded")]
    TemplatesNotLoaded,
    /// The requested template id is not present in the library.
    #[error("unknown template id {id}")]
    UnknownTemplate { id: TemplateId },
}

/// Historical usage counts for a chemical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageHistory {
    /// Times seen as a reactant in the reaction corpus.
    #[serde(default)]
    pub as_reactant: u64,
    /// Times seen as a product in the reaction corpus.
    #[serde(default)]
    pub as_product: u64,
}

/// Template library plus relevance model.
pub trait TemplateStore: Send + Sync {
    /// Ranked applicable templates for `chemical`, most relevant first.
    ///
    /// The result holds at most `max_count` entries and stops before the
    /// entry whose inclusion would push the cumulative probability above
    /// `max_cum_prob` (see [`ranking::truncate_ranked`]).
    fn predict(&self, chemical: &str, max_count: usize, max_cum_prob: f64)
        -> Vec<(TemplateId, f64)>;

    /// Apply a template to `chemical`, returning candidate precursor sets.
    ///
    /// Returns an empty vector when the template is unknown, malformed, or
    /// does not match.
    fn apply(&self, chemical: &str, template: TemplateId) -> Vec<Vec<String>>;

    /// Look up the stored record for a template.
    ///
    /// # Errors
    ///
    /// [`ContractError::TemplatesNotLoaded`] before the library is loaded,
    /// [`ContractError::UnknownTemplate`] for ids not in the library.
    fn lookup(&self, template: TemplateId) -> Result<TemplateRecord, ContractError>;
}

/// Fast plausibility classifier for a fully specified reaction.
pub trait PlausibilityFilter: Send + Sync {
    /// Score `reactants >> product` in `[0, 1]`.
    fn score(&self, reactants: &str, product: &str) -> f64;
}

/// Purchase price and usage history lookups.
pub trait AvailabilityOracle: Send + Sync {
    /// Price per gram from `source`, or `None` if not purchasable.
    fn price(&self, chemical: &str, source: &str) -> Option<f64>;

    /// Usage counts within `template_set`. Unknown chemicals report zeros.
    fn history(&self, chemical: &str, template_set: &str) -> UsageHistory;
}

/// Structural scoring used only by terminal criteria.
pub trait StructureScorer: Send + Sync {
    /// Synthetic complexity score (SCScore scale, 1 to 5).
    fn synthetic_complexity(&self, chemical: &str) -> f64;

    /// Heavy atom counts per element symbol, with implicit hydrogens under
    /// `"H"`. `None` when the molecule cannot be analyzed.
    fn element_counts(&self, chemical: &str) -> Option<BTreeMap<String, u32>>;
}
