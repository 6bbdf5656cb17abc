//! Catalog builders and invariant checks shared by the lock tests.
//!
//! The checks walk the whole graph and panic with the offending SMILES, so a
//! failing test names the node that broke.

use std::collections::BTreeSet;

use retro_harness::catalog::Catalog;
use retro_search::graph::RetroGraph;
use retro_search::node::NodeId;
use retro_search::policy::SearchPolicy;
use retro_search::terminal::TerminalCriteria;
use retro_search::tree::{Collaborators, MctsTree};

/// Policy that stops on an iteration count only.
#[must_use]
pub fn bounded_policy(max_iterations: u64) -> SearchPolicy {
    SearchPolicy {
        expansion_time: 60.0,
        max_iterations: Some(max_iterations),
        ..SearchPolicy::default()
    }
}

/// A fresh tree over `catalog` with default terminal criteria.
///
/// # Panics
///
/// Panics if `policy` is invalid.
#[must_use]
pub fn tree_over(catalog: &Catalog, policy: SearchPolicy) -> MctsTree<'_> {
    MctsTree::new(
        Collaborators::from_provider(catalog),
        policy,
        TerminalCriteria::default(),
    )
    .unwrap()
}

/// A layered catalog rooted at `"M"`.
///
/// Every chemical above the last level has `width` templates, each
/// splitting it into two children one level down. Odd templates also emit
/// a second set that reuses the previous sibling's right child, so the
/// search graph shares chemicals between reactions. Last-level chemicals
/// are buyable. Relevances decrease with the template index and sum to 0.5
/// per chemical, so no template is cut by the cumulative cap.
#[must_use]
pub fn layered_catalog(width: u64, depth: u32) -> Catalog {
    let mut catalog = Catalog::default();
    let mut level = vec!["M".to_string()];
    let mut template = 0_u64;
    #[allow(clippy::cast_precision_loss)]
    let norm = (width * (width + 1)) as f64;
    for d in 0..depth {
        let mut next = Vec::new();
        for parent in &level {
            let mut previous: Option<String> = None;
            for w in 0..width {
                template += 1;
                let left = format!("{parent}{w}a");
                let right = format!("{parent}{w}b");
                #[allow(clippy::cast_precision_loss)]
                let relevance = (width - w) as f64 / norm;
                catalog = catalog
                    .with_template(parent, template, relevance)
                    .with_application(parent, template, &[&left, &right]);
                if let (Some(prev), true) = (previous.as_deref(), w % 2 == 1) {
                    catalog = catalog.with_application(parent, template, &[&left, prev]);
                }
                previous = Some(right.clone());
                next.push(left);
                next.push(right);
            }
        }
        if d + 1 == depth {
            for leaf in &next {
                catalog = catalog.with_price(leaf, 1.0);
            }
        }
        level = next;
    }
    catalog
}

/// Every reaction's `solved` equals "all precursors solved", and every
/// solved chemical is terminal or has a solved reaction child.
///
/// # Panics
///
/// Panics on the first node violating the rule.
pub fn assert_solved_consistent(graph: &RetroGraph) {
    for node in graph.nodes() {
        let children = graph.successors(node.id);
        if node.is_chemical() {
            if node.solved && !node.is_terminal() {
                assert!(
                    children.iter().any(|c| graph.node(*c).solved),
                    "chemical {} solved without a solved reaction",
                    node.smiles
                );
            }
        } else {
            let all = !children.is_empty() && children.iter().all(|c| graph.node(*c).solved);
            assert_eq!(
                node.solved, all,
                "reaction {} solved={} but precursors all solved={all}",
                node.smiles, node.solved
            );
        }
    }
}

/// No node reaches itself.
///
/// # Panics
///
/// Panics naming a node on a cycle.
pub fn assert_acyclic(graph: &RetroGraph) {
    for node in graph.nodes() {
        for child in graph.successors(node.id) {
            assert!(
                !graph.has_path(*child, node.id),
                "cycle through {}",
                node.smiles
            );
        }
    }
}

/// Every node is reachable from `root`, and every edge joins a chemical
/// and a reaction.
///
/// # Panics
///
/// Panics naming an orphan or a same-kind edge.
pub fn assert_bipartite_and_rooted(graph: &RetroGraph, root: NodeId) {
    let mut seen = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        for child in graph.successors(id) {
            assert_ne!(
                graph.node(id).is_chemical(),
                graph.node(*child).is_chemical(),
                "edge {} -> {} joins two nodes of one kind",
                graph.node(id).smiles,
                graph.node(*child).smiles
            );
            stack.push(*child);
        }
    }
    for node in graph.nodes() {
        assert!(seen.contains(&node.id), "{} is unreachable", node.smiles);
    }
}
