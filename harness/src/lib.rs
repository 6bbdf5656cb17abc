//! Retro Harness: planner orchestration around the search core.
//!
//! The harness wires a [`catalog::Catalog`] (or any collaborator set) and a
//! [`config::PlannerConfig`] into one planning run
//! (`build_tree` → `enumerate_paths` → `dump_tree`), hashes the results, and
//! packages them as a verifiable result directory.
//!
//! The harness does NOT implement search logic; it delegates to
//! `retro-search`. Worlds provide fixture data only.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod result_dir;
pub mod runner;
pub mod worlds;
