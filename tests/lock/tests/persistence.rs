//! Node-link persistence and result directory round trips.

use retro_harness::result_dir::{read_result_dir, verify_result_dir, write_result_dir};
use retro_harness::runner::run_world;
use retro_harness::worlds;
use retro_kernel::proof::canon::canonical_bytes_of;
use retro_search::graph::NodeLinkGraphV1;
use retro_search::search::build_tree;
use retro_search::tree::{Collaborators, MctsTree};

#[test]
fn dumped_tree_reloads_with_identical_routes() {
    let world = worlds::by_id("multi_route").unwrap();
    let catalog = world.catalog();
    let config = world.config();
    let fresh = || {
        MctsTree::new(
            Collaborators::from_provider(&catalog),
            config.search.clone(),
            config.terminal.clone(),
        )
        .unwrap()
    };

    let mut original = fresh();
    build_tree(&mut original, world.target()).unwrap();
    let text = serde_json::to_string(&original.dump_tree()).unwrap();

    let doc: NodeLinkGraphV1 = serde_json::from_str(&text).unwrap();
    let mut reloaded = fresh();
    reloaded.load_tree(doc).unwrap();

    assert_eq!(reloaded.target_smiles(), Some(world.target()));
    assert_eq!(
        canonical_bytes_of(&reloaded.dump_tree()).unwrap(),
        canonical_bytes_of(&original.dump_tree()).unwrap()
    );
    assert_eq!(
        reloaded.enumerate_paths(&config.paths).unwrap(),
        original.enumerate_paths(&config.paths).unwrap()
    );
}

#[test]
fn dump_lists_every_node_and_edge() {
    let out = run_world(worlds::by_id("multi_route").unwrap().as_ref()).unwrap();
    let doc: NodeLinkGraphV1 = serde_json::from_slice(&out.tree_bytes).unwrap();
    assert!(doc.directed);
    assert!(!doc.multigraph);
    assert_eq!(doc.nodes.len(), out.report.chemicals + out.report.reactions);
    assert_eq!(doc.links.len(), out.report.edges);
    assert_eq!(doc.graph.target.as_deref(), Some(out.report.target.as_str()));
}

#[test]
fn result_directory_round_trip() {
    let out = run_world(worlds::by_id("single_step").unwrap().as_ref()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_result_dir(&out, dir.path()).unwrap();
    assert_eq!(verify_result_dir(dir.path()).unwrap(), out.digest);
    assert_eq!(read_result_dir(dir.path()).unwrap(), out.report);

    // Rewriting the same outcome is idempotent.
    write_result_dir(&out, dir.path()).unwrap();
    assert_eq!(verify_result_dir(dir.path()).unwrap(), out.digest);
}
