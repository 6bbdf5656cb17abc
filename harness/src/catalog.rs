//! Table-backed collaborators.
//!
//! A [`Catalog`] serves all four collaborator roles from in-memory tables:
//! relevance lists, precomputed template applications, plausibility scores,
//! prices, usage history, and structural scores. It is what the worlds and
//! the CLI plan against when no live chemistry service is attached.
//!
//! Lookups are exact string matches. SMILES are expected to be canonical
//! already.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use retro_kernel::chem::smiles;
use retro_kernel::chem::template::{TemplateId, TemplateRecord};
use retro_kernel::contract::ranking::truncate_ranked;
use retro_kernel::contract::{
    AvailabilityOracle, ContractError, PlausibilityFilter, StructureScorer, TemplateStore,
    UsageHistory,
};

use crate::config::{load_document, ConfigError};

/// One relevance prediction for a chemical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceEntry {
    pub template: TemplateId,
    pub relevance: f64,
}

/// Precursor sets produced by applying `template` to `chemical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    pub chemical: String,
    pub template: TemplateId,
    pub precursors: Vec<Vec<String>>,
}

/// In-memory collaborator tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Template library. Empty means "not loaded".
    pub templates: Vec<TemplateRecord>,
    /// Relevance predictions per chemical, in any order.
    pub relevance: BTreeMap<String, Vec<RelevanceEntry>>,
    pub applications: Vec<ApplicationEntry>,
    /// Plausibility per reaction string `reactants>>product`.
    pub plausibility: BTreeMap<String, f64>,
    /// Score for reactions missing from `plausibility`.
    pub default_plausibility: f64,
    /// Price per gram. Applies to every buyables source.
    pub prices: BTreeMap<String, f64>,
    pub history: BTreeMap<String, UsageHistory>,
    /// Synthetic complexity per chemical.
    pub complexity: BTreeMap<String, f64>,
    pub default_complexity: f64,
    /// Element counts per chemical. Missing entries cannot be analyzed.
    pub elements: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            relevance: BTreeMap::new(),
            applications: Vec::new(),
            plausibility: BTreeMap::new(),
            default_plausibility: 1.0,
            prices: BTreeMap::new(),
            history: BTreeMap::new(),
            complexity: BTreeMap::new(),
            default_complexity: 1.0,
            elements: BTreeMap::new(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a `.json` or `.toml` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_document(path)
    }

    /// Parse a JSON catalog.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Register a template and its relevance for `chemical`.
    ///
    /// The template record is added to the library the first time its id is
    /// seen.
    #[must_use]
    pub fn with_template(mut self, chemical: &str, id: u64, relevance: f64) -> Self {
        let template = TemplateId(id);
        if !self.templates.iter().any(|t| t.id == template) {
            self.templates.push(TemplateRecord {
                id: template,
                reaction_smarts: String::new(),
                provenance_id: format!("rx{id}"),
                count: 1,
                necessary_reagent: String::new(),
                template_set: "reaxys".into(),
            });
        }
        self.relevance
            .entry(chemical.into())
            .or_default()
            .push(RelevanceEntry {
                template,
                relevance,
            });
        self
    }

    /// Record one precursor set for `template` applied to `chemical`.
    #[must_use]
    pub fn with_application(mut self, chemical: &str, id: u64, precursors: &[&str]) -> Self {
        let set: Vec<String> = precursors.iter().map(|p| (*p).to_string()).collect();
        let template = TemplateId(id);
        match self
            .applications
            .iter_mut()
            .find(|a| a.chemical == chemical && a.template == template)
        {
            Some(entry) => entry.precursors.push(set),
            None => self.applications.push(ApplicationEntry {
                chemical: chemical.into(),
                template,
                precursors: vec![set],
            }),
        }
        self
    }

    #[must_use]
    pub fn with_price(mut self, chemical: &str, ppg: f64) -> Self {
        self.prices.insert(chemical.into(), ppg);
        self
    }

    /// Plausibility of `precursors >> product`.
    #[must_use]
    pub fn with_plausibility(mut self, precursors: &[&str], product: &str, score: f64) -> Self {
        self.plausibility
            .insert(smiles::reaction_smiles(precursors, product), score);
        self
    }

    #[must_use]
    pub fn with_history(mut self, chemical: &str, history: UsageHistory) -> Self {
        self.history.insert(chemical.into(), history);
        self
    }

    #[must_use]
    pub fn with_complexity(mut self, chemical: &str, score: f64) -> Self {
        self.complexity.insert(chemical.into(), score);
        self
    }

    #[must_use]
    pub fn with_elements(mut self, chemical: &str, counts: &[(&str, u32)]) -> Self {
        self.elements.insert(
            chemical.into(),
            counts.iter().map(|(e, n)| ((*e).to_string(), *n)).collect(),
        );
        self
    }
}

impl TemplateStore for Catalog {
    fn predict(
        &self,
        chemical: &str,
        max_count: usize,
        max_cum_prob: f64,
    ) -> Vec<(TemplateId, f64)> {
        let scored = self
            .relevance
            .get(chemical)
            .map(|entries| entries.iter().map(|e| (e.template, e.relevance)).collect())
            .unwrap_or_default();
        truncate_ranked(scored, max_count, max_cum_prob)
    }

    fn apply(&self, chemical: &str, template: TemplateId) -> Vec<Vec<String>> {
        self.applications
            .iter()
            .filter(|a| a.chemical == chemical && a.template == template)
            .flat_map(|a| a.precursors.iter().cloned())
            .collect()
    }

    fn lookup(&self, template: TemplateId) -> Result<TemplateRecord, ContractError> {
        if self.templates.is_empty() {
            return Err(ContractError::TemplatesNotLoaded);
        }
        self.templates
            .iter()
            .find(|t| t.id == template)
            .cloned()
            .ok_or(ContractError::UnknownTemplate { id: template })
    }
}

impl PlausibilityFilter for Catalog {
    fn score(&self, reactants: &str, product: &str) -> f64 {
        let key = format!("{reactants}{}{product}", smiles::REACTION_ARROW);
        self.plausibility
            .get(&key)
            .copied()
            .unwrap_or(self.default_plausibility)
    }
}

impl AvailabilityOracle for Catalog {
    fn price(&self, chemical: &str, _source: &str) -> Option<f64> {
        self.prices.get(chemical).copied()
    }

    fn history(&self, chemical: &str, _template_set: &str) -> UsageHistory {
        self.history.get(chemical).copied().unwrap_or_default()
    }
}

impl StructureScorer for Catalog {
    fn synthetic_complexity(&self, chemical: &str) -> f64 {
        self.complexity
            .get(chemical)
            .copied()
            .unwrap_or(self.default_complexity)
    }

    fn element_counts(&self, chemical: &str) -> Option<BTreeMap<String, u32>> {
        self.elements.get(chemical).cloned()
    }
}
