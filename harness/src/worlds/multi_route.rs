//! `multi_route`: a two-level problem with a shared intermediate.
//!
//! ```text
//! T ─ 601 ─> I + B          I ─ 603 ─> C + D
//!   ─ 602 ─> I + E          I ─ 604 ─> F
//! ```
//!
//! `I` is reached from two reactions, so the search graph is a DAG rather
//! than a tree, and route enumeration fans out to four routes. Plausibility
//! scores differ so every ranking metric gives a distinct order.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

pub struct MultiRoute;

const TARGET: &str = "CC(C)Cc1ccc(C(C)C(=O)O)cc1";
const INTERMEDIATE: &str = "CC(C)Cc1ccc(C(C)O)cc1";

impl PlannerWorld for MultiRoute {
    fn world_id(&self) -> &'static str {
        "multi_route"
    }

    fn target(&self) -> &'static str {
        TARGET
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_template(TARGET, 601, 0.6)
            .with_application(TARGET, 601, &[INTERMEDIATE, "O=C=O"])
            .with_plausibility(&[INTERMEDIATE, "O=C=O"], TARGET, 0.9)
            .with_template(TARGET, 602, 0.3)
            .with_application(TARGET, 602, &[INTERMEDIATE, "[C-]#[O+]"])
            .with_plausibility(&[INTERMEDIATE, "[C-]#[O+]"], TARGET, 0.8)
            .with_template(INTERMEDIATE, 603, 0.5)
            .with_application(INTERMEDIATE, 603, &["CC(C)Cc1ccccc1", "CC=O"])
            .with_plausibility(&["CC(C)Cc1ccccc1", "CC=O"], INTERMEDIATE, 0.95)
            .with_template(INTERMEDIATE, 604, 0.4)
            .with_application(INTERMEDIATE, 604, &["CC(=O)c1ccc(CC(C)C)cc1"])
            .with_plausibility(&["CC(=O)c1ccc(CC(C)C)cc1"], INTERMEDIATE, 0.85)
            .with_price("O=C=O", 0.1)
            .with_price("[C-]#[O+]", 0.2)
            .with_price("CC(C)Cc1ccccc1", 3.0)
            .with_price("CC=O", 0.5)
            .with_price("CC(=O)c1ccc(CC(C)C)cc1", 4.0)
    }

    fn config(&self) -> PlannerConfig {
        bounded_config(50)
    }
}
