//! `RetroGraph`: arena-backed chemical/reaction DAG.
//!
//! Nodes live in a single `Vec` indexed by [`NodeId`]. Edges are adjacency
//! lists of ids in both directions, so a chemical reused by several
//! reactions never creates an ownership cycle. The graph only grows; the
//! only way to drop nodes is [`RetroGraph::clear`].
//!
//! The persisted form is a node-link document ([`NodeLinkGraphV1`]) keyed by
//! SMILES, so a dump is readable without knowing arena indices.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::node::{ChemicalData, Node, NodeId, NodeKind, ReactionData};

/// The search DAG.
#[derive(Debug, Clone, Default)]
pub struct RetroGraph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    successors: Vec<Vec<NodeId>>,
    predecessors: Vec<Vec<NodeId>>,
    chemical_count: usize,
    reaction_count: usize,
    edge_count: usize,
}

impl RetroGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.successors.clear();
        self.predecessors.clear();
        self.chemical_count = 0;
        self.reaction_count = 0;
        self.edge_count = 0;
    }

    /// Insert a node keyed by its SMILES.
    ///
    /// If a node with the same SMILES already exists it is left untouched and
    /// its id is returned.
    pub fn insert(&mut self, smiles: String, kind: NodeKind, estimated_value: f64, solved: bool) -> NodeId {
        if let Some(&existing) = self.index.get(&smiles) {
            return existing;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = NodeId(self.nodes.len() as u32);
        match kind {
            NodeKind::Chemical(_) => self.chemical_count += 1,
            NodeKind::Reaction(_) => self.reaction_count += 1,
        }
        self.index.insert(smiles.clone(), id);
        self.nodes.push(Node {
            id,
            smiles,
            visit_count: 1,
            estimated_value,
            solved,
            kind,
        });
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        id
    }

    /// Add a directed edge. Returns `false` if it already existed.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if self.successors[from.index()].contains(&to) {
            return false;
        }
        self.successors[from.index()].push(to);
        self.predecessors[to.index()].push(from);
        self.edge_count += 1;
        true
    }

    /// Look up a node id by SMILES.
    #[must_use]
    pub fn get(&self, smiles: &str) -> Option<NodeId> {
        self.index.get(smiles).copied()
    }

    /// Access a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Chemical payload of `id`, `None` for reactions.
    #[must_use]
    pub fn chemical(&self, id: NodeId) -> Option<&ChemicalData> {
        self.nodes.get(id.index()).and_then(Node::as_chemical)
    }

    /// Mutable chemical payload of `id`, `None` for reactions.
    pub fn chemical_mut(&mut self, id: NodeId) -> Option<&mut ChemicalData> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Chemical(c)) => Some(c),
            _ => None,
        }
    }

    /// Reaction payload of `id`, `None` for chemicals.
    #[must_use]
    pub fn reaction(&self, id: NodeId) -> Option<&ReactionData> {
        self.nodes.get(id.index()).and_then(Node::as_reaction)
    }

    /// Mutable reaction payload of `id`, `None` for chemicals.
    pub fn reaction_mut(&mut self, id: NodeId) -> Option<&mut ReactionData> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Reaction(r)) => Some(r),
            _ => None,
        }
    }

    /// Children of `id` in insertion order.
    #[must_use]
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id.index()]
    }

    /// Parents of `id` in insertion order.
    #[must_use]
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id.index()]
    }

    #[must_use]
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.successors[id.index()].len()
    }

    #[must_use]
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.predecessors[id.index()].len()
    }

    /// Whether a directed path `from → ... → to` exists (a node reaches itself).
    #[must_use]
    pub fn has_path(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        seen[from.index()] = true;
        while let Some(current) = stack.pop() {
            for &next in &self.successors[current.index()] {
                if next == to {
                    return true;
                }
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn chemical_count(&self) -> usize {
        self.chemical_count
    }

    #[must_use]
    pub fn reaction_count(&self) -> usize {
        self.reaction_count
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Summary counts for logging and reports.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        #[allow(clippy::cast_precision_loss)]
        let average_degree = if self.nodes.is_empty() {
            0.0
        } else {
            self.edge_count as f64 / self.nodes.len() as f64
        };
        GraphStats {
            chemicals: self.chemical_count,
            reactions: self.reaction_count,
            edges: self.edge_count,
            average_in_degree: average_degree,
            average_out_degree: average_degree,
        }
    }

    /// Convert to the persisted node-link form.
    #[must_use]
    pub fn to_node_link(&self, target: Option<&str>) -> NodeLinkGraphV1 {
        let links = self
            .nodes
            .iter()
            .flat_map(|n| {
                self.successors[n.id.index()]
                    .iter()
                    .map(move |s| NodeLinkEdgeV1 {
                        source: n.smiles.clone(),
                        target: self.nodes[s.index()].smiles.clone(),
                    })
            })
            .collect();
        NodeLinkGraphV1 {
            directed: true,
            multigraph: false,
            graph: NodeLinkMetaV1 {
                target: target.map(str::to_string),
            },
            nodes: self.nodes.clone(),
            links,
        }
    }

    /// Rebuild a graph from its node-link form.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedTree`] for duplicate node ids or
    /// links that reference unknown nodes.
    pub fn from_node_link(doc: NodeLinkGraphV1) -> Result<Self, SearchError> {
        let mut graph = Self::new();
        for node in doc.nodes {
            if graph.get(&node.smiles).is_some() {
                return Err(SearchError::MalformedTree {
                    detail: format!("duplicate node {}", node.smiles),
                });
            }
            let id = graph.insert(node.smiles, node.kind, node.estimated_value, node.solved);
            graph.nodes[id.index()].visit_count = node.visit_count;
        }
        for link in doc.links {
            let (Some(from), Some(to)) = (graph.get(&link.source), graph.get(&link.target)) else {
                return Err(SearchError::MalformedTree {
                    detail: format!("link {} -> {} references an unknown node", link.source, link.target),
                });
            };
            graph.add_edge(from, to);
        }
        Ok(graph)
    }
}

/// Aggregate graph counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphStats {
    pub chemicals: usize,
    pub reactions: usize,
    pub edges: usize,
    pub average_in_degree: f64,
    pub average_out_degree: f64,
}

/// Node-link document for the whole DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraphV1 {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: NodeLinkMetaV1,
    pub nodes: Vec<Node>,
    pub links: Vec<NodeLinkEdgeV1>,
}

/// Graph-level attributes of a node-link document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkMetaV1 {
    /// SMILES of the search target, if the tree was initialized.
    #[serde(default)]
    pub target: Option<String>,
}

/// One directed edge, by SMILES.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkEdgeV1 {
    pub source: String,
    pub target: String,
}
