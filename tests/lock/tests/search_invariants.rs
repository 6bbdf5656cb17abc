//! Structural invariants checked after every rollout.
//!
//! - Done chemicals are never expanded again.
//! - Reaction `solved` matches its precursors after every rollout.
//! - The graph stays acyclic, bipartite, and rooted.
//! - The root's visit count grows by one per rollout.
//! - Chemicals at or past the depth cap are done.

use std::collections::BTreeSet;

use lock_tests::planner_test_helpers::{
    assert_acyclic, assert_bipartite_and_rooted, assert_solved_consistent, bounded_policy,
    layered_catalog, tree_over,
};
use retro_search::error::SearchError;
use retro_search::node::NodeId;
use retro_search::policy::SearchPolicy;
use retro_search::tree::MctsTree;

fn done_chemicals(tree: &MctsTree<'_>) -> BTreeSet<NodeId> {
    tree.graph()
        .nodes()
        .filter(|n| n.as_chemical().is_some_and(|c| c.done))
        .map(|n| n.id)
        .collect()
}

/// Run rollouts one at a time, checking every invariant in between.
/// Returns the number of completed rollouts.
fn checked_rollouts(tree: &mut MctsTree<'_>, target: &str, limit: usize) -> u64 {
    let root = tree.initialize(target);
    let mut completed = 0;
    for _ in 0..limit {
        if tree.is_root_done() {
            break;
        }
        let done_before = done_chemicals(tree);
        match tree.rollout() {
            Ok(record) => {
                if !record.already_explored {
                    assert!(
                        !done_before.contains(&record.leaf),
                        "expanded {} after it was done",
                        tree.graph().node(record.leaf).smiles
                    );
                }
            }
            Err(SearchError::SelectionExhausted) => {
                assert!(
                    tree.refresh_chemical_done(root),
                    "selection exhausted below an open root"
                );
                break;
            }
            Err(e) => panic!("rollout failed: {e}"),
        }
        completed += 1;

        let graph = tree.graph();
        assert_solved_consistent(graph);
        assert_acyclic(graph);
        assert_bipartite_and_rooted(graph, root);
        assert_eq!(graph.node(root).visit_count, 1 + completed);
    }
    completed
}

#[test]
fn invariants_hold_on_layered_catalog() {
    let catalog = layered_catalog(3, 3);
    let mut tree = tree_over(&catalog, bounded_policy(400));
    let rollouts = checked_rollouts(&mut tree, "M", 400);
    assert!(rollouts > 0);
    assert!(tree.is_solved());
}

#[test]
fn invariants_hold_under_tight_branching() {
    let catalog = layered_catalog(4, 2);
    let policy = SearchPolicy {
        max_branching: 2,
        ..bounded_policy(200)
    };
    let mut tree = tree_over(&catalog, policy);
    checked_rollouts(&mut tree, "M", 200);
    assert!(tree.is_root_done());
}

#[test]
fn solved_is_monotone() {
    let catalog = layered_catalog(2, 3);
    let mut tree = tree_over(&catalog, bounded_policy(300));
    tree.initialize("M");
    let mut solved: BTreeSet<NodeId> = BTreeSet::new();
    while !tree.is_root_done() {
        match tree.rollout() {
            Ok(_) => {}
            Err(SearchError::SelectionExhausted) => {
                panic!("selection exhausted below an open root")
            }
            Err(e) => panic!("rollout failed: {e}"),
        }
        for id in &solved {
            assert!(tree.graph().node(*id).solved, "node {id:?} lost solved");
        }
        solved = tree
            .graph()
            .nodes()
            .filter(|n| n.solved)
            .map(|n| n.id)
            .collect();
    }
    assert!(!solved.is_empty());
}

#[test]
fn chemicals_past_depth_cap_are_done() {
    let catalog = layered_catalog(2, 4);
    let policy = SearchPolicy {
        max_depth: 2,
        ..bounded_policy(300)
    };
    let max_depth = policy.max_depth;
    let mut tree = tree_over(&catalog, policy);
    checked_rollouts(&mut tree, "M", 300);
    for node in tree.graph().nodes() {
        if let Some(chem) = node.as_chemical() {
            if chem.min_depth.is_some_and(|d| d >= max_depth) {
                assert!(chem.done, "{} at depth {:?} is not done", node.smiles, chem.min_depth);
            }
        }
    }
    // Leaves sit below the cap, so nothing can be solved.
    assert!(!tree.is_solved());
}
