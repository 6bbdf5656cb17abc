//! `banned_reaction`: the most relevant disconnection is banned, so the
//! planner must fall through to the next template.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

pub struct BannedReaction;

const TARGET: &str = "CC(=O)Nc1ccccc1";

/// The reaction string the configuration bans.
pub const BANNED: &str = "CC(=O)Cl.Nc1ccccc1>>CC(=O)Nc1ccccc1";

impl PlannerWorld for BannedReaction {
    fn world_id(&self) -> &'static str {
        "banned_reaction"
    }

    fn target(&self) -> &'static str {
        TARGET
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_template(TARGET, 401, 0.7)
            .with_application(TARGET, 401, &["CC(=O)Cl", "Nc1ccccc1"])
            .with_template(TARGET, 402, 0.2)
            .with_application(TARGET, 402, &["CC(=O)OC(C)=O", "Nc1ccccc1"])
            .with_price("CC(=O)Cl", 1.0)
            .with_price("CC(=O)OC(C)=O", 1.0)
            .with_price("Nc1ccccc1", 1.0)
    }

    fn config(&self) -> PlannerConfig {
        let mut config = bounded_config(20);
        config.search.banned_reactions.insert(BANNED.into());
        config
    }
}
