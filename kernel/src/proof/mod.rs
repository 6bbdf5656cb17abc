//! Canonical serialization and hashing.

pub mod canon;
pub mod hash;
pub mod hash_domain;
