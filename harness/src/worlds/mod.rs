//! Fixture planning problems.
//!
//! Each world is a target, a catalog, and a configuration small enough to
//! reason about by hand. Every world caps `max_iterations` so runs end on a
//! count, never on the clock.

pub mod banned_reaction;
pub mod branching_cap;
pub mod cyclic;
pub mod multi_route;
pub mod single_step;
pub mod terminal_target;

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

/// A self-contained planning problem.
pub trait PlannerWorld {
    /// Stable name used on the command line and in reports.
    fn world_id(&self) -> &'static str;

    /// Chemical to plan for.
    fn target(&self) -> &'static str;

    fn catalog(&self) -> Catalog;

    fn config(&self) -> PlannerConfig;
}

/// Every registered world, in a fixed order.
#[must_use]
pub fn all() -> Vec<Box<dyn PlannerWorld>> {
    vec![
        Box::new(single_step::SingleStep),
        Box::new(terminal_target::TerminalTarget),
        Box::new(cyclic::Cyclic),
        Box::new(banned_reaction::BannedReaction),
        Box::new(branching_cap::BranchingCap),
        Box::new(multi_route::MultiRoute),
    ]
}

/// Look up a world by id.
#[must_use]
pub fn by_id(id: &str) -> Option<Box<dyn PlannerWorld>> {
    all().into_iter().find(|w| w.world_id() == id)
}

/// Configuration shared by the worlds: deterministic iteration cap and a
/// generous clock.
pub(crate) fn bounded_config(max_iterations: u64) -> PlannerConfig {
    let mut config = PlannerConfig::default();
    config.search.expansion_time = 60.0;
    config.search.max_iterations = Some(max_iterations);
    config
}
