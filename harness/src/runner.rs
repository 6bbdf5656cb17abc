//! Planner runner: one target, one configuration, one hashed result.
//!
//! The runner uses ONLY search-crate APIs for planning and kernel APIs for
//! hashing. It adds no search logic of its own.
//!
//! # Pipeline
//!
//! ```text
//! validate config → MctsTree::new → build_tree
//!   → retrieve_template_data → routes → route_to_json
//!   → dump_tree → canonical bytes → digests → PlannerReportV1
//! ```
//!
//! Everything in the report is a function of the target, the collaborators,
//! and the configuration. Wall-clock timings are logged but never reported,
//! so two runs that stop on the same iteration budget produce byte-identical
//! artifacts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use retro_kernel::proof::canon::{canonical_bytes_of, canonical_json_bytes, CanonError};
use retro_kernel::proof::hash::{canonical_hash, ContentHash};
use retro_kernel::proof::hash_domain::HashDomain;
use retro_search::error::SearchError;
use retro_search::export::route_to_json;
use retro_search::search::{build_tree, BuildReport, TerminationReason};
use retro_search::tree::{Collaborators, MctsTree};

use crate::config::{ConfigError, PlannerConfig};
use crate::worlds::PlannerWorld;

/// Schema tag written into every report.
pub const REPORT_SCHEMA_VERSION: &str = "planner_report.v1";

/// File name of the node-link search graph.
pub const TREE_FILE: &str = "tree.json";
/// File name of the ranked route list.
pub const ROUTES_FILE: &str = "routes.json";

/// Error during a planner run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("search: {0}")]
    Search(#[from] SearchError),
    #[error("canonical JSON: {0}")]
    Canon(#[from] CanonError),
}

/// Summary of one ranked route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummaryV1 {
    /// Zero-based position after ranking.
    pub rank: usize,
    /// `canonical_hash(RouteTree, canonical route JSON)`.
    pub digest: String,
    pub reactions: usize,
    pub starting_materials: usize,
    pub plausibility: f64,
}

/// Deterministic summary of a planner run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerReportV1 {
    pub schema_version: String,
    pub target: String,
    pub termination: TerminationReason,
    pub iterations: u64,
    pub root_solved: bool,
    pub chemicals: usize,
    pub reactions: usize,
    pub edges: usize,
    /// `canonical_hash(PlannerConfig, canonical config JSON)`.
    pub config_digest: String,
    /// `canonical_hash(SearchGraph, tree.json bytes)`.
    pub graph_digest: String,
    pub routes: Vec<RouteSummaryV1>,
    /// File name to `canonical_hash(ResultArtifact, file bytes)`.
    pub artifacts: BTreeMap<String, String>,
}

/// Everything a planner run produced.
#[derive(Debug, Clone)]
pub struct PlannerOutcome {
    pub report: PlannerReportV1,
    /// Includes timings; not part of any digest.
    pub build: BuildReport,
    /// Exported routes, best first, in the configured layout.
    pub routes: Vec<serde_json::Value>,
    /// Canonical bytes of `tree.json`.
    pub tree_bytes: Vec<u8>,
    /// Canonical bytes of `routes.json`.
    pub routes_bytes: Vec<u8>,
    /// Canonical bytes of `report.json`.
    pub report_bytes: Vec<u8>,
    /// `canonical_hash(ResultDigest, report_bytes)`.
    pub digest: ContentHash,
}

/// Plan routes for `target` with the given collaborators.
///
/// # Errors
///
/// Returns [`RunError::Config`] for an invalid configuration,
/// [`RunError::Search`] if the search or template retrieval fails, and
/// [`RunError::Canon`] if an artifact cannot be canonicalized (for example
/// a non-finite score).
pub fn run_planner(
    target: &str,
    collaborators: Collaborators<'_>,
    config: &PlannerConfig,
) -> Result<PlannerOutcome, RunError> {
    config.validate()?;
    let mut tree = MctsTree::new(collaborators, config.search.clone(), config.terminal.clone())?;
    let build = build_tree(&mut tree, target)?;

    tree.retrieve_template_data()?;
    let ranked = tree.routes(&config.paths)?;
    let graph = tree.graph();

    let mut routes = Vec::with_capacity(ranked.len());
    let mut summaries = Vec::with_capacity(ranked.len());
    for (rank, route) in ranked.iter().enumerate() {
        let value = route_to_json(graph, route, config.paths.path_format)?;
        let bytes = canonical_json_bytes(&value)?;
        summaries.push(RouteSummaryV1 {
            rank,
            digest: canonical_hash(HashDomain::RouteTree, &bytes).to_string(),
            reactions: route.reaction_depth(graph),
            starting_materials: route.leaf_count(),
            plausibility: route.plausibility(graph),
        });
        routes.push(value);
    }

    let tree_bytes = canonical_bytes_of(&tree.dump_tree())?;
    let routes_bytes = canonical_bytes_of(&routes)?;
    let config_bytes = canonical_bytes_of(config)?;

    let artifacts = BTreeMap::from([
        (
            ROUTES_FILE.to_string(),
            canonical_hash(HashDomain::ResultArtifact, &routes_bytes).to_string(),
        ),
        (
            TREE_FILE.to_string(),
            canonical_hash(HashDomain::ResultArtifact, &tree_bytes).to_string(),
        ),
    ]);

    let report = PlannerReportV1 {
        schema_version: REPORT_SCHEMA_VERSION.into(),
        target: target.into(),
        termination: build.termination,
        iterations: build.iterations,
        root_solved: build.root_solved,
        chemicals: build.stats.chemicals,
        reactions: build.stats.reactions,
        edges: build.stats.edges,
        config_digest: canonical_hash(HashDomain::PlannerConfig, &config_bytes).to_string(),
        graph_digest: canonical_hash(HashDomain::SearchGraph, &tree_bytes).to_string(),
        routes: summaries,
        artifacts,
    };
    let report_bytes = canonical_bytes_of(&report)?;
    let digest = canonical_hash(HashDomain::ResultDigest, &report_bytes);

    info!(
        chemical = target,
        termination = %report.termination,
        solved = report.root_solved,
        routes = report.routes.len(),
        %digest,
        "planner run complete"
    );

    Ok(PlannerOutcome {
        report,
        build,
        routes,
        tree_bytes,
        routes_bytes,
        report_bytes,
        digest,
    })
}

/// Run a fixture world with its own catalog and configuration.
///
/// # Errors
///
/// See [`run_planner`].
pub fn run_world(world: &dyn PlannerWorld) -> Result<PlannerOutcome, RunError> {
    let catalog = world.catalog();
    let config = world.config();
    info!(world = world.world_id(), "running world");
    run_planner(
        world.target(),
        Collaborators::from_provider(&catalog),
        &config,
    )
}
