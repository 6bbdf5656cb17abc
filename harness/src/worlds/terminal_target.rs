//! `terminal_target`: the target is itself purchasable.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

/// Ethanol, buyable and also reachable by one reduction.
pub struct TerminalTarget;

impl PlannerWorld for TerminalTarget {
    fn world_id(&self) -> &'static str {
        "terminal_target"
    }

    fn target(&self) -> &'static str {
        "CCO"
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_price("CCO", 1.0)
            .with_template("CCO", 201, 0.9)
            .with_application("CCO", 201, &["CC=O"])
            .with_price("CC=O", 2.0)
    }

    fn config(&self) -> PlannerConfig {
        bounded_config(20)
    }
}
