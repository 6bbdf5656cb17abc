//! Determinism locks.
//!
//! - In-process: repeated runs of every world produce identical bytes.
//! - Cross-process: the `plan_fixture` binary prints identical digests
//!   under different working directories and locale settings, and they
//!   match the in-process digests.
//! - No paths or timings in hashed surfaces.

use std::process::Command;

use retro_harness::runner::run_world;
use retro_harness::worlds;

#[test]
fn every_world_is_deterministic_in_process() {
    for world in worlds::all() {
        let first = run_world(world.as_ref()).unwrap();
        for _ in 0..5 {
            let again = run_world(world.as_ref()).unwrap();
            assert_eq!(again.tree_bytes, first.tree_bytes, "{}", world.world_id());
            assert_eq!(again.routes_bytes, first.routes_bytes, "{}", world.world_id());
            assert_eq!(again.digest, first.digest, "{}", world.world_id());
        }
    }
}

#[test]
fn reports_carry_no_timings_or_paths() {
    let out = run_world(worlds::by_id("multi_route").unwrap().as_ref()).unwrap();
    let report = String::from_utf8(out.report_bytes).unwrap();
    for needle in ["elapsed", "time_to_first_solution", "/tmp", "/root", "\\\\"] {
        assert!(!report.contains(needle), "report contains {needle:?}");
    }
}

fn run_fixture(world: &str, work_dir: &std::path::Path, env: &[(&str, &str)]) -> String {
    let bin = env!("CARGO_BIN_EXE_plan_fixture");
    let mut command = Command::new(bin);
    command
        .arg(world)
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LANG")
        .env("RUST_LOG", "off");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {bin}: {e}"));
    assert!(
        output.status.success(),
        "plan_fixture exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn crossproc_digests_match() {
    let scratch = tempfile::tempdir().unwrap();
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    for world in ["multi_route", "cyclic"] {
        let baseline = run_fixture(world, root, &[]);
        let moved = run_fixture(world, scratch.path(), &[]);
        let locale = run_fixture(world, scratch.path(), &[("LC_ALL", "C"), ("LANG", "tr_TR.UTF-8")]);
        assert_eq!(baseline, moved, "{world}: cwd changed output");
        assert_eq!(baseline, locale, "{world}: locale changed output");

        let inproc = run_world(worlds::by_id(world).unwrap().as_ref()).unwrap();
        let expected = format!("result_digest={}", inproc.digest);
        assert_eq!(baseline.lines().next(), Some(expected.as_str()));
    }
}
