//! Binary that runs one fixture world and prints its digests, for
//! cross-process determinism checks.
//!
//! Usage: `plan_fixture <world_id>`
//!
//! Output: `key=value` lines.

use retro_harness::runner::run_world;
use retro_harness::worlds;

fn main() {
    let id = std::env::args().nth(1).expect("usage: plan_fixture <world_id>");
    let world = worlds::by_id(&id).unwrap_or_else(|| panic!("unknown world {id}"));
    let outcome = run_world(world.as_ref()).expect("planner run failed");

    println!("result_digest={}", outcome.digest);
    println!("graph_digest={}", outcome.report.graph_digest);
    println!("config_digest={}", outcome.report.config_digest);
    println!("termination={}", outcome.report.termination);
    println!("iterations={}", outcome.report.iterations);
    for route in &outcome.report.routes {
        println!("route.{}={}", route.rank, route.digest);
    }
}
