//! `single_step`: one template splits the target into two purchasable
//! precursors.

use crate::catalog::Catalog;
use crate::config::PlannerConfig;

use super::{bounded_config, PlannerWorld};

/// Ester hydrolysis in reverse: ethyl acetate from ethanol and acetic acid.
pub struct SingleStep;

impl PlannerWorld for SingleStep {
    fn world_id(&self) -> &'static str {
        "single_step"
    }

    fn target(&self) -> &'static str {
        "CCOC(C)=O"
    }

    fn catalog(&self) -> Catalog {
        Catalog::default()
            .with_template("CCOC(C)=O", 101, 0.8)
            .with_application("CCOC(C)=O", 101, &["CCO", "CC(=O)O"])
            .with_plausibility(&["CCO", "CC(=O)O"], "CCOC(C)=O", 0.97)
            .with_price("CCO", 1.0)
            .with_price("CC(=O)O", 1.5)
    }

    fn config(&self) -> PlannerConfig {
        bounded_config(20)
    }
}
