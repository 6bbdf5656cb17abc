//! Route extraction properties on a fully explored DAG.
//!
//! - Validated routes end only in terminal chemicals.
//! - Every route edge exists in the graph.
//! - Ranking is monotone in the chosen metric.
//! - `max_trees` counts accepted routes.
//! - Shared intermediates fan out into the cartesian product of sub-routes.

use std::collections::BTreeSet;

use lock_tests::planner_test_helpers::{bounded_policy, layered_catalog, tree_over};
use retro_harness::runner::run_world;
use retro_harness::worlds;
use retro_search::graph::RetroGraph;
use retro_search::paths::{PathOptions, RouteTree, SortingMetric};
use retro_search::search::{build_tree, TerminationReason};
use retro_search::tree::MctsTree;

fn explored(catalog: &retro_harness::catalog::Catalog) -> MctsTree<'_> {
    let mut tree = tree_over(catalog, bounded_policy(1_000));
    let report = build_tree(&mut tree, "M").unwrap();
    assert_eq!(report.termination, TerminationReason::RootDone);
    assert!(report.root_solved);
    tree
}

fn assert_edges_exist(graph: &RetroGraph, route: &RouteTree) {
    for node in route.iter() {
        for child in &node.children {
            assert!(
                graph.successors(node.node).contains(&child.node),
                "route edge {} -> {} is not in the graph",
                graph.node(node.node).smiles,
                graph.node(child.node).smiles
            );
        }
    }
}

#[test]
fn layered_routes_are_the_full_product() {
    // Root: three reactions. Each precursor: three reactions over buyables.
    let catalog = layered_catalog(2, 2);
    let tree = explored(&catalog);
    let routes = tree.routes(&PathOptions::default()).unwrap();
    assert_eq!(routes.len(), 27);

    let distinct: BTreeSet<String> = routes.iter().map(|r| format!("{r:?}")).collect();
    assert_eq!(distinct.len(), routes.len(), "duplicate routes");

    for route in &routes {
        assert!(route.all_leaves_terminal(tree.graph()));
        assert_edges_exist(tree.graph(), route);
        assert_eq!(route.reaction_depth(tree.graph()), 2);
    }
}

#[test]
fn max_trees_caps_accepted_routes() {
    let catalog = layered_catalog(2, 2);
    let tree = explored(&catalog);
    let options = PathOptions {
        max_trees: Some(5),
        ..PathOptions::default()
    };
    assert_eq!(tree.routes(&options).unwrap().len(), 5);
}

#[test]
fn shallow_depth_limit_drops_unfinished_routes() {
    let catalog = layered_catalog(2, 2);
    let tree = explored(&catalog);
    let shallow = PathOptions {
        max_depth: Some(1),
        ..PathOptions::default()
    };
    assert!(tree.routes(&shallow).unwrap().is_empty());

    let unvalidated = PathOptions {
        validate_paths: false,
        ..shallow
    };
    let routes = tree.routes(&unvalidated).unwrap();
    assert_eq!(routes.len(), 3);
    assert!(routes.iter().all(|r| !r.all_leaves_terminal(tree.graph())));
}

#[test]
fn plausibility_ranking_is_non_increasing() {
    let out = run_world(worlds::by_id("multi_route").unwrap().as_ref()).unwrap();
    let scores: Vec<f64> = out.report.routes.iter().map(|r| r.plausibility).collect();
    assert_eq!(scores.len(), 4);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
    assert!((scores[0] - 0.9 * 0.95).abs() < 1e-12);
    assert!((scores[3] - 0.8 * 0.85).abs() < 1e-12);
}

#[test]
fn size_metrics_rank_ascending() {
    let world = worlds::by_id("multi_route").unwrap();
    let catalog = world.catalog();
    let mut config = world.config();
    let mut tree = MctsTree::new(
        retro_search::tree::Collaborators::from_provider(&catalog),
        config.search.clone(),
        config.terminal.clone(),
    )
    .unwrap();
    build_tree(&mut tree, world.target()).unwrap();

    config.paths.sorting_metric = SortingMetric::NumberOfStartingMaterials;
    let routes = tree.routes(&config.paths).unwrap();
    let leaves: Vec<usize> = routes.iter().map(RouteTree::leaf_count).collect();
    assert_eq!(leaves, vec![2, 2, 3, 3]);

    config.paths.sorting_metric = SortingMetric::NumberOfReactions;
    let routes = tree.routes(&config.paths).unwrap();
    assert!(routes
        .iter()
        .all(|r| r.reaction_depth(tree.graph()) == 2));
}
