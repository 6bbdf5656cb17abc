//! End-to-end scenarios over the fixture worlds and small catalogs.

use retro_harness::catalog::Catalog;
use retro_harness::runner::{run_planner, run_world};
use retro_harness::worlds::{self, banned_reaction};
use retro_kernel::chem::smiles::reaction_smiles;
use retro_search::search::{build_tree, TerminationReason};
use retro_search::terminal::TerminalCriteria;
use retro_search::tree::{Collaborators, MctsTree};

use lock_tests::planner_test_helpers::{assert_acyclic, bounded_policy, tree_over};

fn world_tree<'a>(id: &str, catalog: &'a Catalog) -> MctsTree<'a> {
    let world = worlds::by_id(id).unwrap();
    let config = world.config();
    let mut tree = MctsTree::new(
        Collaborators::from_provider(catalog),
        config.search,
        config.terminal,
    )
    .unwrap();
    build_tree(&mut tree, world.target()).unwrap();
    tree
}

#[test]
fn terminal_target_yields_single_trivial_route() {
    let out = run_world(worlds::by_id("terminal_target").unwrap().as_ref()).unwrap();
    assert_eq!(out.report.termination, TerminationReason::TargetTerminal);
    assert!(out.report.root_solved);
    assert_eq!(out.report.chemicals, 1);
    assert_eq!(out.report.reactions, 0);
    assert_eq!(out.routes.len(), 1);
    assert_eq!(out.routes[0]["smiles"], "CCO");
    assert_eq!(out.routes[0]["ppg"], 1.0);
}

#[test]
fn expanding_a_terminal_target_keeps_searching() {
    let world = worlds::by_id("terminal_target").unwrap();
    let catalog = world.catalog();
    let mut config = world.config();
    config.search.expand_terminal_target = true;
    let out = run_planner(world.target(), Collaborators::from_provider(&catalog), &config).unwrap();
    assert!(out.report.iterations > 0);
    assert_eq!(out.report.reactions, 1);
    assert_eq!(out.report.routes.len(), 1);
    assert_eq!(out.report.routes[0].reactions, 1);
}

#[test]
fn single_step_route_has_both_precursors() {
    let out = run_world(worlds::by_id("single_step").unwrap().as_ref()).unwrap();
    assert_eq!(out.report.routes.len(), 1);
    let reaction = &out.routes[0]["children"][0];
    assert_eq!(reaction["smiles"], "CCO.CC(=O)O>>CCOC(C)=O");
    assert_eq!(reaction["plausibility"], 0.97);
    let leaves: Vec<&str> = reaction["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["smiles"].as_str().unwrap())
        .collect();
    assert_eq!(leaves, vec!["CCO", "CC(=O)O"]);
}

#[test]
fn single_step_target_is_solved_after_one_rollout() {
    let world = worlds::by_id("single_step").unwrap();
    let catalog = world.catalog();
    let mut tree = tree_over(&catalog, bounded_policy(1));
    tree.initialize(world.target());
    assert!(!tree.is_solved());

    tree.rollout().unwrap();
    assert!(tree.is_solved());
    assert!(tree.is_root_done());
    let routes = tree.routes(&Default::default()).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].reaction_depth(tree.graph()), 1);
    assert_eq!(routes[0].leaf_count(), 2);
}

#[test]
fn banned_reaction_falls_through_to_next_template() {
    let catalog = worlds::by_id("banned_reaction").unwrap().catalog();
    let tree = world_tree("banned_reaction", &catalog);
    assert!(tree.graph().get(banned_reaction::BANNED).is_none());
    assert!(tree.is_solved());

    let out = run_world(worlds::by_id("banned_reaction").unwrap().as_ref()).unwrap();
    assert_eq!(out.routes.len(), 1);
    assert_eq!(
        out.routes[0]["children"][0]["tforms"],
        serde_json::json!(["rx402"])
    );
}

#[test]
fn branching_cap_of_one_keeps_a_single_root_reaction() {
    let catalog = worlds::by_id("branching_cap").unwrap().catalog();
    let tree = world_tree("branching_cap", &catalog);
    let root = tree.root().unwrap();
    assert_eq!(tree.graph().out_degree(root), 1);
    assert!(tree.is_root_done());
    assert_eq!(tree.routes(&Default::default()).unwrap().len(), 1);
}

#[test]
fn cyclic_disconnection_is_rejected() {
    let catalog = worlds::by_id("cyclic").unwrap().catalog();
    let tree = world_tree("cyclic", &catalog);
    assert_acyclic(tree.graph());
    let back = reaction_smiles(&["CC(=O)OC"], "CC(=O)O");
    assert!(tree.graph().get(&back).is_none(), "{back} was added");
    assert!(tree.is_solved());

    let routes = tree.routes(&Default::default()).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].reaction_depth(tree.graph()), 2);
}

#[test]
fn price_ceiling_makes_expensive_leaves_non_terminal() {
    let catalog = Catalog::default()
        .with_template("T", 1, 0.9)
        .with_application("T", 1, &["A"])
        .with_price("A", 500.0);
    let criteria = TerminalCriteria {
        max_ppg: Some(100.0),
        ..TerminalCriteria::default()
    };
    let mut tree = MctsTree::new(
        Collaborators::from_provider(&catalog),
        bounded_policy(20),
        criteria,
    )
    .unwrap();
    let report = build_tree(&mut tree, "T").unwrap();
    assert_eq!(report.termination, TerminationReason::RootDone);
    assert!(!report.root_solved);
    let a = tree.graph().get("A").unwrap();
    assert!(!tree.graph().node(a).is_terminal());
    assert!(tree.routes(&Default::default()).unwrap().is_empty());
}

#[test]
fn implausible_reactions_never_enter_the_graph() {
    let catalog = Catalog::default()
        .with_template("T", 1, 0.6)
        .with_application("T", 1, &["A"])
        .with_plausibility(&["A"], "T", 0.2)
        .with_template("T", 2, 0.3)
        .with_application("T", 2, &["B"])
        .with_price("A", 1.0)
        .with_price("B", 1.0);
    let mut tree = MctsTree::new(
        Collaborators::from_provider(&catalog),
        bounded_policy(20),
        TerminalCriteria::default(),
    )
    .unwrap();
    build_tree(&mut tree, "T").unwrap();
    assert!(tree.graph().get("A>>T").is_none());
    assert!(tree.graph().get("A").is_none());
    assert!(tree.graph().get("B>>T").is_some());
    assert!(tree.is_solved());
}
