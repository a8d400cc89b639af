//! Long-lived background tasks started after login.
//!
//! # Responsibility
//! - Periodically flush the note store (`autosave`).
//! - Enforce the trial window (`watchdog`).
//!
//! # Invariants
//! - Both tasks run on their own named OS threads for the process lifetime.
//! - They share nothing except the note store's lock.
//! - Neither task ever panics or exits on a recoverable failure.

pub mod autosave;
pub mod watchdog;
