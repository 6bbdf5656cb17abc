//! Retro Kernel: collaborator contracts and canonical serialization for the
//! route planner.
//!
//! # API Surface
//!
//! - [`chem`] -- chemical and reaction identifiers, template identity
//! - [`contract`] -- traits the search core consumes from external services
//!   (template store, plausibility filter, availability oracle, structure scorer)
//! - [`proof`] -- canonical JSON bytes and domain-separated SHA-256 digests
//!
//! # Module Dependency Direction
//!
//! `chem` ← `contract`, `proof` standalone.
//!
//! The kernel performs no search. It holds the vocabulary every other crate
//! in the workspace agrees on.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chem;
pub mod contract;
pub mod proof;
