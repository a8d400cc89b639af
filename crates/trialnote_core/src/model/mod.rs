//! Domain records shared by the store, persistence and session layers.
//!
//! # Invariants
//! - A `Note` is keyed by `title`; only `content` changes after creation.
//! - An `Owner` is always a filesystem-safe identity.

pub mod note;
pub mod owner;
