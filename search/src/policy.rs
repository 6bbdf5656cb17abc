//! Search policy: budgets, branching, filters.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Tree-building configuration.
///
/// Every field has a default; configuration files may set any subset.
/// Several fields accept the option names of the older tree builder as
/// aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    /// Wall-clock expansion budget in seconds.
    pub expansion_time: f64,
    /// Hard cap on rollouts.
    pub max_iterations: Option<u64>,
    /// Stop once the tree holds this many chemical nodes.
    pub max_chemicals: Option<usize>,
    /// Stop once the tree holds this many reaction nodes.
    pub max_reactions: Option<usize>,
    /// Reaction children per chemical before new templates stop being offered.
    pub max_branching: usize,
    /// Depth at which chemicals are considered done.
    pub max_depth: usize,
    /// UCB exploration weight.
    pub exploration_weight: f64,
    /// Stop as soon as the target is solved.
    pub return_first: bool,
    /// Default cap on extracted routes.
    pub max_trees: Option<usize>,
    /// Chemicals that may never appear as precursors.
    #[serde(alias = "forbidden_molecules")]
    pub banned_chemicals: BTreeSet<String>,
    /// Reaction strings that may never be added.
    #[serde(alias = "known_bad_reactions")]
    pub banned_reactions: BTreeSet<String>,
    /// Maximum templates predicted per chemical.
    #[serde(alias = "template_count")]
    pub template_max_count: usize,
    /// Cumulative relevance cap for predicted templates.
    #[serde(alias = "max_cum_template_prob")]
    pub template_max_cum_prob: f64,
    /// Minimum plausibility for a precursor set to be accepted.
    pub fast_filter_threshold: f64,
    /// Template set used for usage history lookups.
    pub template_set: String,
    /// Price source passed to the availability oracle.
    pub buyables_source: String,
    /// Keep searching even when the target itself is terminal.
    pub expand_terminal_target: bool,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            expansion_time: 30.0,
            max_iterations: None,
            max_chemicals: None,
            max_reactions: None,
            max_branching: 25,
            max_depth: 10,
            exploration_weight: 1.0,
            return_first: false,
            max_trees: None,
            banned_chemicals: BTreeSet::new(),
            banned_reactions: BTreeSet::new(),
            template_max_count: 100,
            template_max_cum_prob: 0.995,
            fast_filter_threshold: 0.75,
            template_set: "reaxys".into(),
            buyables_source: "all".into(),
            expand_terminal_target: false,
        }
    }
}

impl SearchPolicy {
    /// Reject values the search loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.expansion_time.is_finite() || self.expansion_time < 0.0 {
            return Err(SearchError::invalid("expansion_time", self.expansion_time));
        }
        if self.max_branching == 0 {
            return Err(SearchError::invalid("max_branching", self.max_branching));
        }
        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err(SearchError::invalid(
                "exploration_weight",
                self.exploration_weight,
            ));
        }
        if !(self.template_max_cum_prob > 0.0 && self.template_max_cum_prob <= 1.0) {
            return Err(SearchError::invalid(
                "template_max_cum_prob",
                self.template_max_cum_prob,
            ));
        }
        if !(0.0..=1.0).contains(&self.fast_filter_threshold) {
            return Err(SearchError::invalid(
                "fast_filter_threshold",
                self.fast_filter_threshold,
            ));
        }
        Ok(())
    }

    /// The wall-clock budget as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] for negative or non-finite
    /// values.
    pub fn expansion_budget(&self) -> Result<Duration, SearchError> {
        Duration::try_from_secs_f64(self.expansion_time)
            .map_err(|_| SearchError::invalid("expansion_time", self.expansion_time))
    }
}
