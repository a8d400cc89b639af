//! Use-case services over the persistence layer.
//!
//! # Responsibility
//! - Enforce note invariants in one place for CLI and background callers.
//! - Keep callers decoupled from snapshot file details.

pub mod note_store;
