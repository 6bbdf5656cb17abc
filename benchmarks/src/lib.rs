//! Shared helpers for the planner benchmark suites.

use retro_harness::catalog::Catalog;
use retro_search::policy::SearchPolicy;
use retro_search::search::build_tree;
use retro_search::terminal::TerminalCriteria;
use retro_search::tree::{Collaborators, MctsTree};

/// Target of every synthetic catalog.
pub const SYNTHETIC_TARGET: &str = "X";

/// A catalog where every non-leaf chemical has `width` templates, each
/// splitting it into two chemicals one level down, for `depth` levels.
/// Leaves are buyable. Templates at odd positions reuse the previous
/// template's right-hand precursor in a second set, so chemicals are shared.
#[must_use]
pub fn synthetic_catalog(width: u64, depth: u32) -> Catalog {
    let mut catalog = Catalog::default();
    let mut frontier = vec![SYNTHETIC_TARGET.to_string()];
    let mut next_template = 0_u64;
    #[allow(clippy::cast_precision_loss)]
    let total = (width * (width + 1)) as f64;
    for level in 0..depth {
        let mut below = Vec::with_capacity(frontier.len() * 2 * usize::try_from(width).unwrap_or(0));
        for chemical in &frontier {
            for slot in 0..width {
                next_template += 1;
                let left = format!("{chemical}_{slot}L");
                let right = format!("{chemical}_{slot}R");
                #[allow(clippy::cast_precision_loss)]
                let relevance = (width - slot) as f64 / total;
                catalog = catalog
                    .with_template(chemical, next_template, relevance)
                    .with_application(chemical, next_template, &[&left, &right]);
                if slot % 2 == 1 {
                    let shared = format!("{chemical}_{}R", slot - 1);
                    catalog = catalog.with_application(chemical, next_template, &[&left, &shared]);
                }
                below.push(left);
                below.push(right);
            }
        }
        if level + 1 == depth {
            for leaf in &below {
                catalog = catalog.with_price(leaf, 1.0);
            }
        }
        frontier = below;
    }
    catalog
}

/// Policy that stops only on rollout count.
#[must_use]
pub fn rollout_policy(max_iterations: u64) -> SearchPolicy {
    SearchPolicy {
        expansion_time: 3_600.0,
        max_iterations: Some(max_iterations),
        ..SearchPolicy::default()
    }
}

/// An initialized, unexpanded tree over `catalog`.
///
/// # Panics
///
/// Panics if `policy` is invalid. Benchmark setup failures are fatal.
#[must_use]
pub fn fresh_tree(catalog: &Catalog, policy: SearchPolicy) -> MctsTree<'_> {
    let mut tree = MctsTree::new(
        Collaborators::from_provider(catalog),
        policy,
        TerminalCriteria::default(),
    )
    .expect("valid benchmark policy");
    tree.initialize(SYNTHETIC_TARGET);
    tree
}

/// A tree built to completion (or `max_iterations`) over `catalog`.
///
/// # Panics
///
/// Panics if the build fails.
#[must_use]
pub fn explored_tree(catalog: &Catalog, max_iterations: u64) -> MctsTree<'_> {
    let mut tree = MctsTree::new(
        Collaborators::from_provider(catalog),
        rollout_policy(max_iterations),
        TerminalCriteria::default(),
    )
    .expect("valid benchmark policy");
    build_tree(&mut tree, SYNTHETIC_TARGET).expect("benchmark tree build");
    tree
}
