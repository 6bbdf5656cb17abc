//! Chemical and reaction node types.
//!
//! A node is a tagged union: shared bookkeeping (visit count, value, solved)
//! lives on [`Node`], kind-specific data lives in [`NodeKind`]. Nodes are
//! owned by the [`crate::graph::RetroGraph`] arena and referenced by
//! [`NodeId`].

use serde::{Deserialize, Serialize};

use retro_kernel::chem::template::TemplateId;
use retro_kernel::contract::UsageHistory;

/// Stable arena index of a node.
///
/// Assigned in creation order. Ids are never reused until the graph is
/// cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into the arena vectors.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the search DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Arena index (not persisted; reassigned on load).
    #[serde(skip)]
    pub id: NodeId,
    /// Canonical SMILES of the chemical, or the reaction string.
    pub smiles: String,
    /// Number of rollouts that passed through this node (starts at 1).
    pub visit_count: u64,
    /// Accumulated evidence of route feasibility.
    #[serde(rename = "est_value")]
    pub estimated_value: f64,
    /// A fully terminal-leaved decomposition is known below this node.
    pub solved: bool,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Chemical data, if this is a chemical node.
    #[must_use]
    pub fn as_chemical(&self) -> Option<&ChemicalData> {
        match &self.kind {
            NodeKind::Chemical(c) => Some(c),
            NodeKind::Reaction(_) => None,
        }
    }

    /// Reaction data, if this is a reaction node.
    #[must_use]
    pub fn as_reaction(&self) -> Option<&ReactionData> {
        match &self.kind {
            NodeKind::Reaction(r) => Some(r),
            NodeKind::Chemical(_) => None,
        }
    }

    /// Whether this node is a chemical.
    #[must_use]
    pub fn is_chemical(&self) -> bool {
        matches!(self.kind, NodeKind::Chemical(_))
    }

    /// The `terminal` flag for chemicals; reactions are never terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.as_chemical().is_some_and(|c| c.terminal)
    }
}

/// Kind-specific node data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Chemical(ChemicalData),
    Reaction(ReactionData),
}

/// Chemical node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalData {
    /// Applicable templates with relevance, most relevant first.
    pub templates: Vec<(TemplateId, f64)>,
    /// Templates already applied to this chemical, in application order.
    pub explored: Vec<TemplateId>,
    /// Purchase price per gram, `None` if not purchasable.
    pub purchase_price: Option<f64>,
    /// Historical usage counts.
    #[serde(flatten)]
    pub history: UsageHistory,
    /// Fixed at creation by the terminal criteria.
    pub terminal: bool,
    /// No further expansion is useful. Cached; refreshed on each visit.
    pub done: bool,
    /// Shallowest depth at which a rollout reached this chemical.
    pub min_depth: Option<usize>,
}

impl ChemicalData {
    /// Relevance of `template` for this chemical, if it was predicted.
    #[must_use]
    pub fn relevance(&self, template: TemplateId) -> Option<f64> {
        self.templates
            .iter()
            .find(|(t, _)| *t == template)
            .map(|(_, p)| *p)
    }

    /// Whether `template` has been applied already.
    #[must_use]
    pub fn is_explored(&self, template: TemplateId) -> bool {
        self.explored.contains(&template)
    }

    /// Most relevant template that has not been applied yet.
    #[must_use]
    pub fn next_unexplored(&self) -> Option<(TemplateId, f64)> {
        self.templates
            .iter()
            .find(|(t, _)| !self.is_explored(*t))
            .copied()
    }

    /// Every predicted template has been applied.
    #[must_use]
    pub fn fully_explored(&self) -> bool {
        self.explored.len() >= self.templates.len()
    }
}

/// Reaction node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionData {
    /// Templates that produce this exact precursor set.
    pub templates: Vec<TemplateId>,
    /// Plausibility from the fast filter.
    pub ff_score: f64,
    /// Maximum relevance among contributing templates.
    pub template_score: f64,
    /// Resolved template provenance; filled in before export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<TemplateProvenance>,
}

/// Template library data attached to a reaction for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateProvenance {
    /// Provenance ids of the contributing templates.
    pub tforms: Vec<String>,
    /// Sum of literature example counts over contributing templates.
    pub num_examples: u64,
    /// Reagent required by the first contributing template.
    pub necessary_reagent: String,
}
