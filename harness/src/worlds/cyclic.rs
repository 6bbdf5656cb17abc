//! `cyclic`: a template maps an intermediate back onto the target.
//!
//! `T → A` and `A → T` would close a cycle; the second expansion must be
//! rejected, and `A` only resolves through its other template.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

pub struct Cyclic;

const TARGET: &str = "CC(=O)OC";
const ACID: &str = "CC(=O)O";

impl PlannerWorld for Cyclic {
    fn world_id(&self) -> &'static str {
        "cyclic"
    }

    fn target(&self) -> &'static str {
        TARGET
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_template(TARGET, 301, 0.9)
            .with_application(TARGET, 301, &[ACID])
            .with_template(ACID, 302, 0.6)
            .with_application(ACID, 302, &[TARGET])
            .with_template(ACID, 303, 0.3)
            .with_application(ACID, 303, &["CC=O"])
            .with_price("CC=O", 2.0)
    }

    fn config(&self) -> PlannerConfig {
        bounded_config(30)
    }
}
