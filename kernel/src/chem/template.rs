//! Template identity and records.

use serde::{Deserialize, Serialize};

/// Stable identifier of a transformation template in the template store.
///
/// Identifiers are opaque to the planner; ordering is used only for
/// deterministic tie-breaking in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u64);

impl TemplateId {
    /// The raw index.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A template as stored in the template library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Template index (the key used for relevance prediction).
    pub id: TemplateId,
    /// Retro reaction rule text (SMARTS).
    pub reaction_smarts: String,
    /// Provenance identifier in the source database (`"-1"` when unknown).
    #[serde(default = "unknown_provenance")]
    pub provenance_id: String,
    /// Number of literature examples backing this template.
    #[serde(default = "one")]
    pub count: u64,
    /// Reagent required for the forward reaction, empty if none.
    #[serde(default)]
    pub necessary_reagent: String,
    /// Template set this record belongs to.
    #[serde(default)]
    pub template_set: String,
}

fn unknown_provenance() -> String {
    "-1".into()
}

fn one() -> u64 {
    1
}
