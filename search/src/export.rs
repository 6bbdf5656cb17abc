//! Nested route documents for external consumers.
//!
//! A route is serialized as a tree of node objects, each carrying its own
//! `children` list. Ids are assigned in pre-order per route, starting at 0.
//! The legacy layout renames a few fields and replaces the `type` tag with
//! `is_chemical` / `is_reaction` booleans; it is a pure remapping of the
//! native layout.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use retro_kernel::chem::template::TemplateId;

use crate::error::SearchError;
use crate::graph::RetroGraph;
use crate::node::NodeKind;
use crate::paths::RouteTree;

/// Field naming of exported routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathFormat {
    /// Field names as stored on the graph nodes.
    Native,
    /// Field names of the older tree-builder output.
    #[default]
    Legacy,
}

impl FromStr for PathFormat {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "legacy" => Ok(Self::Legacy),
            other => Err(SearchError::invalid("path format", other)),
        }
    }
}

/// One node of a route in native layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNodeV1 {
    pub id: u64,
    pub smiles: String,
    #[serde(flatten)]
    pub detail: RouteDetailV1,
    pub solved: bool,
    pub visit_count: u64,
    pub est_value: f64,
    pub children: Vec<RouteNodeV1>,
}

/// Kind-specific fields of a native route node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouteDetailV1 {
    Chemical {
        purchase_price: Option<f64>,
        as_reactant: u64,
        as_product: u64,
        terminal: bool,
    },
    Reaction {
        ff_score: f64,
        template_score: f64,
        templates: Vec<TemplateId>,
        num_templates: usize,
        tforms: Vec<String>,
        num_examples: u64,
        necessary_reagent: String,
    },
}

/// One node of a route in legacy layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRouteNodeV1 {
    pub smiles: String,
    pub id: u64,
    #[serde(flatten)]
    pub detail: LegacyDetailV1,
    pub children: Vec<LegacyRouteNodeV1>,
}

/// Kind-specific fields of a legacy route node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyDetailV1 {
    Chemical {
        is_chemical: bool,
        as_reactant: u64,
        as_product: u64,
        ppg: Option<f64>,
    },
    Reaction {
        is_reaction: bool,
        plausibility: f64,
        template_score: f64,
        tforms: Vec<String>,
        num_examples: u64,
        necessary_reagent: String,
    },
}

impl From<&RouteNodeV1> for LegacyRouteNodeV1 {
    fn from(node: &RouteNodeV1) -> Self {
        let detail = match &node.detail {
            RouteDetailV1::Chemical {
                purchase_price,
                as_reactant,
                as_product,
                ..
            } => LegacyDetailV1::Chemical {
                is_chemical: true,
                as_reactant: *as_reactant,
                as_product: *as_product,
                ppg: *purchase_price,
            },
            RouteDetailV1::Reaction {
                ff_score,
                template_score,
                tforms,
                num_examples,
                necessary_reagent,
                ..
            } => LegacyDetailV1::Reaction {
                is_reaction: true,
                plausibility: *ff_score,
                template_score: *template_score,
                tforms: tforms.clone(),
                num_examples: *num_examples,
                necessary_reagent: necessary_reagent.clone(),
            },
        };
        Self {
            smiles: node.smiles.clone(),
            id: node.id,
            detail,
            children: node.children.iter().map(Self::from).collect(),
        }
    }
}

/// Build the native document for `route`.
#[must_use]
pub fn native_route(graph: &RetroGraph, route: &RouteTree) -> RouteNodeV1 {
    let mut next_id = 0;
    build_native(graph, route, &mut next_id)
}

fn build_native(graph: &RetroGraph, route: &RouteTree, next_id: &mut u64) -> RouteNodeV1 {
    let id = *next_id;
    *next_id += 1;
    let node = graph.node(route.node);
    let detail = match &node.kind {
        NodeKind::Chemical(c) => RouteDetailV1::Chemical {
            purchase_price: c.purchase_price,
            as_reactant: c.history.as_reactant,
            as_product: c.history.as_product,
            terminal: c.terminal,
        },
        NodeKind::Reaction(r) => {
            let provenance = r.provenance.clone().unwrap_or_default();
            RouteDetailV1::Reaction {
                ff_score: r.ff_score,
                template_score: r.template_score,
                templates: r.templates.clone(),
                num_templates: r.templates.len(),
                tforms: provenance.tforms,
                num_examples: provenance.num_examples,
                necessary_reagent: provenance.necessary_reagent,
            }
        }
    };
    let children = route
        .children
        .iter()
        .map(|child| build_native(graph, child, next_id))
        .collect();
    RouteNodeV1 {
        id,
        smiles: node.smiles.clone(),
        detail,
        solved: node.solved,
        visit_count: node.visit_count,
        est_value: node.estimated_value,
        children,
    }
}

/// Serialize `route` in the requested layout.
///
/// # Errors
///
/// Returns [`SearchError::Export`] if the document cannot be represented
/// as JSON.
pub fn route_to_json(
    graph: &RetroGraph,
    route: &RouteTree,
    format: PathFormat,
) -> Result<serde_json::Value, SearchError> {
    let native = native_route(graph, route);
    let value = match format {
        PathFormat::Native => serde_json::to_value(&native),
        PathFormat::Legacy => serde_json::to_value(LegacyRouteNodeV1::from(&native)),
    };
    value.map_err(|e| SearchError::Export {
        detail: e.to_string(),
    })
}
