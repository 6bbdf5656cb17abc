//! Retro Search: Monte Carlo Tree Search over a chemical/reaction DAG.
//!
//! This crate provides the search layer for the route planner. It depends
//! only on `retro_kernel`. It does NOT depend on `retro_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! retro_kernel  ←  retro_search  ←  retro_harness
//! (contracts)      (tree, paths)     (config, catalog, runner)
//! ```
//!
//! # Key types
//!
//! - [`graph::RetroGraph`] -- arena DAG of chemical and reaction nodes
//! - [`tree::MctsTree`] -- selection, expansion, backpropagation
//! - [`search::build_tree`] -- the budgeted rollout loop
//! - [`terminal::TerminalEvaluator`] -- and/or terminal criteria
//! - [`paths::enumerate_routes`] -- lazy route enumeration from the DAG
//! - [`export`] -- nested route JSON in native or legacy field naming

#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod graph;
pub mod node;
pub mod paths;
pub mod policy;
pub mod scorer;
pub mod search;
pub mod terminal;
pub mod tree;
