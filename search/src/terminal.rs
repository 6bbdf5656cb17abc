//! Terminal criteria: when is a chemical good enough to stop expanding.
//!
//! Each enabled criterion lands in an "and" or an "or" bucket. Purchasability
//! is always evaluated and always sits in the "and" bucket. The verdict is
//! `all(and) || any(or)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use retro_kernel::contract::{StructureScorer, UsageHistory};

use crate::error::SearchError;

/// Bucket a criterion contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    And,
    Or,
}

/// Per-criterion bucket assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationLogic {
    pub max_ppg: Logic,
    pub max_scscore: Logic,
    pub max_elements: Logic,
    pub min_history: Logic,
}

impl Default for TerminationLogic {
    fn default() -> Self {
        Self {
            max_ppg: Logic::And,
            max_scscore: Logic::Or,
            max_elements: Logic::Or,
            min_history: Logic::Or,
        }
    }
}

/// Thresholds for the optional criteria. `None` disables a criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalCriteria {
    /// Maximum price per gram.
    pub max_ppg: Option<f64>,
    /// Maximum synthetic complexity score.
    pub max_scscore: Option<f64>,
    /// Maximum atom count per element symbol.
    pub max_elements: Option<BTreeMap<String, u32>>,
    /// Minimum usage counts; either count reaching its floor suffices.
    pub min_history: Option<UsageHistory>,
    /// Bucket assignment for each criterion.
    pub termination_logic: TerminationLogic,
}

impl TerminalCriteria {
    /// Whether any enabled criterion needs a [`StructureScorer`].
    #[must_use]
    pub fn needs_structure(&self) -> bool {
        self.max_scscore.is_some() || self.max_elements.is_some()
    }
}

/// Evaluates [`TerminalCriteria`] for newly created chemicals.
pub struct TerminalEvaluator<'c> {
    criteria: TerminalCriteria,
    structure: Option<&'c dyn StructureScorer>,
}

impl std::fmt::Debug for TerminalEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalEvaluator")
            .field("criteria", &self.criteria)
            .field("structure", &self.structure.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Buckets {
    and: Vec<bool>,
    or: Vec<bool>,
}

impl Buckets {
    fn push(&mut self, logic: Logic, result: bool) {
        match logic {
            Logic::And => self.and.push(result),
            Logic::Or => self.or.push(result),
        }
    }

    fn verdict(&self) -> bool {
        self.and.iter().all(|r| *r) || self.or.iter().any(|r| *r)
    }
}

impl<'c> TerminalEvaluator<'c> {
    /// Build an evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] if a structural
    /// criterion is configured without a structure scorer.
    pub fn new(
        criteria: TerminalCriteria,
        structure: Option<&'c dyn StructureScorer>,
    ) -> Result<Self, SearchError> {
        if criteria.needs_structure() && structure.is_none() {
            return Err(SearchError::precondition(
                "max_scscore/max_elements require a structure scorer",
            ));
        }
        Ok(Self {
            criteria,
            structure,
        })
    }

    #[must_use]
    pub fn criteria(&self) -> &TerminalCriteria {
        &self.criteria
    }

    /// Decide whether `smiles` is terminal.
    #[must_use]
    pub fn is_terminal(&self, smiles: &str, price: Option<f64>, history: &UsageHistory) -> bool {
        let logic = self.criteria.termination_logic;
        let mut buckets = Buckets::default();
        buckets.and.push(price.is_some());

        if let (Some(max_ppg), Some(ppg)) = (self.criteria.max_ppg, price) {
            buckets.push(logic.max_ppg, ppg <= max_ppg);
        }

        if let (Some(max_sc), Some(scorer)) = (self.criteria.max_scscore, self.structure) {
            let score = scorer.synthetic_complexity(smiles);
            buckets.push(logic.max_scscore, score <= max_sc);
        }

        if let (Some(limits), Some(scorer)) = (&self.criteria.max_elements, self.structure) {
            if let Some(counts) = scorer.element_counts(smiles) {
                let within = limits
                    .iter()
                    .all(|(elem, max)| counts.get(elem).copied().unwrap_or(0) <= *max);
                buckets.push(logic.max_elements, within);
            }
        }

        if let Some(floor) = self.criteria.min_history {
            let seen = history.as_reactant >= floor.as_reactant
                || history.as_product >= floor.as_product;
            buckets.push(logic.min_history, seen);
        }

        buckets.verdict()
    }
}
