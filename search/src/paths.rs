//! Route enumeration over a finished DAG.
//!
//! A chemical with several reaction children, or a reaction with several
//! precursors that each have several sub-routes, fans out into distinct
//! routes. Enumeration is lazy: routes are produced one at a time by
//! restartable iterators, so `take(n)` stops the walk early.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::export::PathFormat;
use crate::graph::RetroGraph;
use crate::node::NodeId;

/// Ranking applied to extracted routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingMetric {
    /// Product of reaction plausibilities, highest first.
    #[default]
    Plausibility,
    /// Reactions on the longest root-to-leaf path, fewest first.
    NumberOfReactions,
    /// Leaf count, fewest first.
    NumberOfStartingMaterials,
}

impl FromStr for SortingMetric {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plausibility" => Ok(Self::Plausibility),
            "number_of_reactions" => Ok(Self::NumberOfReactions),
            "number_of_starting_materials" => Ok(Self::NumberOfStartingMaterials),
            other => Err(SearchError::invalid("sorting metric", other)),
        }
    }
}

/// Extraction options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub sorting_metric: SortingMetric,
    /// Keep only routes whose leaves are all terminal.
    pub validate_paths: bool,
    /// Overrides the policy's `max_depth`.
    pub max_depth: Option<usize>,
    /// Overrides the policy's `max_trees`.
    pub max_trees: Option<usize>,
    pub path_format: PathFormat,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            sorting_metric: SortingMetric::Plausibility,
            validate_paths: true,
            max_depth: None,
            max_trees: None,
            path_format: PathFormat::Legacy,
        }
    }
}

/// One route: a tree of node references into the DAG.
///
/// Chemical and reaction levels alternate, starting at the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTree {
    pub node: NodeId,
    pub children: Vec<RouteTree>,
}

impl RouteTree {
    #[must_use]
    pub fn leaf(node: NodeId) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Pre-order walk.
    pub fn iter(&self) -> impl Iterator<Item = &RouteTree> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Product of `ff_score` over the route's reactions.
    #[must_use]
    pub fn plausibility(&self, graph: &RetroGraph) -> f64 {
        self.iter()
            .filter_map(|t| graph.reaction(t.node))
            .map(|r| r.ff_score)
            .product()
    }

    /// Reactions on the longest root-to-leaf path.
    #[must_use]
    pub fn reaction_depth(&self, graph: &RetroGraph) -> usize {
        let below = self
            .children
            .iter()
            .map(|c| c.reaction_depth(graph))
            .max()
            .unwrap_or(0);
        if graph.reaction(self.node).is_some() {
            below + 1
        } else {
            below
        }
    }

    /// Number of leaves (starting materials).
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|t| t.children.is_empty()).count()
    }

    /// Every leaf is a terminal chemical.
    #[must_use]
    pub fn all_leaves_terminal(&self, graph: &RetroGraph) -> bool {
        self.iter()
            .filter(|t| t.children.is_empty())
            .all(|t| graph.node(t.node).is_terminal())
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

/// Lazy sequence of routes.
pub type Routes<'g> = Box<dyn Iterator<Item = RouteTree> + 'g>;

/// Every route below `root`, depth-limited.
///
/// Chemical depth grows by one per reaction level. A chemical ends a route
/// when it has no reaction children or sits at `max_depth`.
#[must_use]
pub fn enumerate_routes(graph: &RetroGraph, root: NodeId, max_depth: usize) -> Routes<'_> {
    chemical_routes(graph, root, 0, max_depth)
}

fn chemical_routes(graph: &RetroGraph, chemical: NodeId, depth: usize, max_depth: usize) -> Routes<'_> {
    let reactions = graph.successors(chemical);
    if reactions.is_empty() || depth >= max_depth {
        return Box::new(std::iter::once(RouteTree::leaf(chemical)));
    }
    Box::new(reactions.iter().flat_map(move |&reaction| {
        reaction_routes(graph, reaction, depth + 1, max_depth).map(move |sub| RouteTree {
            node: chemical,
            children: vec![sub],
        })
    }))
}

fn reaction_routes(graph: &RetroGraph, reaction: NodeId, depth: usize, max_depth: usize) -> Routes<'_> {
    let precursors = graph.successors(reaction).to_vec();
    Box::new(
        CartesianRoutes::new(graph, precursors, depth, max_depth).map(move |children| RouteTree {
            node: reaction,
            children,
        }),
    )
}

/// Odometer over the route sequences of a reaction's precursors.
///
/// The last precursor varies fastest. An exhausted position is restarted by
/// enumerating that precursor again, so no sub-route list is materialized.
struct CartesianRoutes<'g> {
    graph: &'g RetroGraph,
    precursors: Vec<NodeId>,
    depth: usize,
    max_depth: usize,
    iters: Vec<Routes<'g>>,
    current: Vec<RouteTree>,
    started: bool,
    exhausted: bool,
}

impl<'g> CartesianRoutes<'g> {
    fn new(graph: &'g RetroGraph, precursors: Vec<NodeId>, depth: usize, max_depth: usize) -> Self {
        Self {
            graph,
            precursors,
            depth,
            max_depth,
            iters: Vec::new(),
            current: Vec::new(),
            started: false,
            exhausted: false,
        }
    }

    fn restart(&self, position: usize) -> Routes<'g> {
        chemical_routes(self.graph, self.precursors[position], self.depth, self.max_depth)
    }

    fn first(&mut self) -> Option<Vec<RouteTree>> {
        self.started = true;
        for position in 0..self.precursors.len() {
            let mut iter = self.restart(position);
            let head = iter.next()?;
            self.iters.push(iter);
            self.current.push(head);
        }
        Some(self.current.clone())
    }

    fn advance(&mut self) -> Option<Vec<RouteTree>> {
        for position in (0..self.precursors.len()).rev() {
            if let Some(next) = self.iters[position].next() {
                self.current[position] = next;
                return Some(self.current.clone());
            }
            let mut iter = self.restart(position);
            self.current[position] = iter.next()?;
            self.iters[position] = iter;
        }
        None
    }
}

impl Iterator for CartesianRoutes<'_> {
    type Item = Vec<RouteTree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = if self.started {
            self.advance()
        } else {
            self.first()
        };
        if item.is_none() {
            self.exhausted = true;
        }
        item
    }
}

/// Stable sort by `metric`.
pub fn sort_routes(routes: &mut [RouteTree], graph: &RetroGraph, metric: SortingMetric) {
    match metric {
        SortingMetric::Plausibility => {
            routes.sort_by(|a, b| b.plausibility(graph).total_cmp(&a.plausibility(graph)));
        }
        SortingMetric::NumberOfReactions => routes.sort_by_key(|r| r.reaction_depth(graph)),
        SortingMetric::NumberOfStartingMaterials => routes.sort_by_key(RouteTree::leaf_count),
    }
}

/// Enumerate, optionally validate, cap, and rank routes below `root`.
///
/// The cap counts accepted routes only.
#[must_use]
pub fn extract_routes(
    graph: &RetroGraph,
    root: NodeId,
    max_depth: usize,
    max_trees: Option<usize>,
    validate: bool,
    metric: SortingMetric,
) -> Vec<RouteTree> {
    let accepted = enumerate_routes(graph, root, max_depth)
        .filter(|route| !validate || route.all_leaves_terminal(graph));
    let mut routes: Vec<RouteTree> = match max_trees {
        Some(cap) => accepted.take(cap).collect(),
        None => accepted.collect(),
    };
    sort_routes(&mut routes, graph, metric);
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ChemicalData, NodeKind, ReactionData};
    use retro_kernel::chem::template::TemplateId;
    use retro_kernel::contract::UsageHistory;

    fn chem(terminal: bool) -> NodeKind {
        NodeKind::Chemical(ChemicalData {
            templates: Vec::new(),
            explored: Vec::new(),
            purchase_price: terminal.then_some(1.0),
            history: UsageHistory::default(),
            terminal,
            done: terminal,
            min_depth: None,
        })
    }

    fn rxn(ff_score: f64) -> NodeKind {
        NodeKind::Reaction(ReactionData {
            templates: vec![TemplateId(1)],
            ff_score,
            template_score: 1.0,
            provenance: None,
        })
    }

    /// T has two routes (via A or via B.C); B has two routes of its own.
    fn diamond() -> (RetroGraph, NodeId) {
        let mut g = RetroGraph::new();
        let t = g.insert("T".into(), chem(false), 0.0, false);
        let a = g.insert("A".into(), chem(true), 1.0, true);
        let b = g.insert("B".into(), chem(false), 0.0, false);
        let c = g.insert("C".into(), chem(true), 1.0, true);
        let d = g.insert("D".into(), chem(true), 1.0, true);
        let e = g.insert("E".into(), chem(false), 0.0, false);
        let r1 = g.insert("A>>T".into(), rxn(0.9), 0.0, false);
        let r2 = g.insert("B.C>>T".into(), rxn(0.8), 0.0, false);
        let r3 = g.insert("D>>B".into(), rxn(0.5), 0.0, false);
        let r4 = g.insert("E>>B".into(), rxn(0.99), 0.0, false);
        for (from, to) in [
            (t, r1),
            (r1, a),
            (t, r2),
            (r2, b),
            (r2, c),
            (b, r3),
            (r3, d),
            (b, r4),
            (r4, e),
        ] {
            g.add_edge(from, to);
        }
        (g, t)
    }

    fn leaves(g: &RetroGraph, route: &RouteTree) -> Vec<String> {
        route
            .iter()
            .filter(|t| t.children.is_empty())
            .map(|t| g.node(t.node).smiles.clone())
            .collect()
    }

    #[test]
    fn enumerates_cartesian_product_of_sub_routes() {
        let (g, t) = diamond();
        let routes: Vec<_> = enumerate_routes(&g, t, 10).collect();
        assert_eq!(routes.len(), 3);
        assert_eq!(leaves(&g, &routes[0]), vec!["A"]);
        assert_eq!(leaves(&g, &routes[1]), vec!["D", "C"]);
        assert_eq!(leaves(&g, &routes[2]), vec!["E", "C"]);
    }

    #[test]
    fn enumeration_is_restartable() {
        let (g, t) = diamond();
        let first: Vec<_> = enumerate_routes(&g, t, 10).collect();
        let second: Vec<_> = enumerate_routes(&g, t, 10).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn depth_limit_cuts_routes_at_chemicals() {
        let (g, t) = diamond();
        let routes: Vec<_> = enumerate_routes(&g, t, 1).collect();
        assert_eq!(routes.len(), 2);
        assert_eq!(leaves(&g, &routes[1]), vec!["B", "C"]);

        let root_only: Vec<_> = enumerate_routes(&g, t, 0).collect();
        assert_eq!(root_only.len(), 1);
        assert_eq!(root_only[0].node_count(), 1);
    }

    #[test]
    fn validation_drops_routes_with_open_leaves() {
        let (g, t) = diamond();
        let routes = extract_routes(&g, t, 10, None, true, SortingMetric::Plausibility);
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.all_leaves_terminal(&g)));
    }

    #[test]
    fn cap_counts_accepted_routes_only() {
        let (g, t) = diamond();
        let routes = extract_routes(&g, t, 10, Some(2), true, SortingMetric::NumberOfReactions);
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn plausibility_ranking_is_non_increasing() {
        let (g, t) = diamond();
        let routes = extract_routes(&g, t, 10, None, false, SortingMetric::Plausibility);
        let scores: Vec<f64> = routes.iter().map(|r| r.plausibility(&g)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
        assert!((scores[0] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn metric_helpers() {
        let (g, t) = diamond();
        let routes: Vec<_> = enumerate_routes(&g, t, 10).collect();
        assert_eq!(routes[0].reaction_depth(&g), 1);
        assert_eq!(routes[1].reaction_depth(&g), 2);
        assert_eq!(routes[1].leaf_count(), 2);
        assert!((routes[1].plausibility(&g) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn reaction_count_and_leaf_sorts_ascend() {
        let (g, t) = diamond();
        let mut routes: Vec<_> = enumerate_routes(&g, t, 10).collect();
        routes.reverse();
        sort_routes(&mut routes, &g, SortingMetric::NumberOfReactions);
        assert_eq!(routes[0].reaction_depth(&g), 1);
        sort_routes(&mut routes, &g, SortingMetric::NumberOfStartingMaterials);
        assert_eq!(routes[0].leaf_count(), 1);
    }

    #[test]
    fn unknown_metric_is_invalid_argument() {
        let err = "cheapest".parse::<SortingMetric>().unwrap_err();
        assert_eq!(
            err,
            SearchError::InvalidArgument {
                what: "sorting metric",
                value: "cheapest".into()
            }
        );
        assert_eq!(
            "number_of_reactions".parse::<SortingMetric>().unwrap(),
            SortingMetric::NumberOfReactions
        );
    }
}
