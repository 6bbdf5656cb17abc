//! `branching_cap`: three buyable disconnections but `max_branching = 1`.
//!
//! The root still receives its first reaction; no further templates are
//! offered once it has one child.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

pub struct BranchingCap;

const TARGET: &str = "c1ccc(-c2ccccc2)cc1";

impl PlannerWorld for BranchingCap {
    fn world_id(&self) -> &'static str {
        "branching_cap"
    }

    fn target(&self) -> &'static str {
        TARGET
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_template(TARGET, 501, 0.5)
            .with_application(TARGET, 501, &["Brc1ccccc1", "OB(O)c1ccccc1"])
            .with_template(TARGET, 502, 0.3)
            .with_application(TARGET, 502, &["Ic1ccccc1", "OB(O)c1ccccc1"])
            .with_template(TARGET, 503, 0.1)
            .with_application(TARGET, 503, &["Clc1ccccc1", "[Mg]c1ccccc1"])
            .with_price("Brc1ccccc1", 1.0)
            .with_price("Ic1ccccc1", 1.0)
            .with_price("Clc1ccccc1", 1.0)
            .with_price("OB(O)c1ccccc1", 1.0)
            .with_price("[Mg]c1ccccc1", 1.0)
    }

    fn config(&self) -> PlannerConfig {
        let mut config = bounded_config(20);
        config.search.max_branching = 1;
        config
    }
}
