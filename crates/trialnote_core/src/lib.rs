//! Core logic for trialnote.
//! This crate is the single source of truth for note store invariants.

pub mod auth;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod runtime;
pub mod service;
pub mod session;

pub use auth::{CredentialError, CredentialStore};
pub use config::{AppConfig, ConfigError, CorruptSnapshotPolicy};
pub use logging::{default_log_level, flush_logs, init_logging, logging_status};
pub use model::note::Note;
pub use model::owner::{Owner, OwnerError};
pub use repo::snapshot_repo::{JsonSnapshotRepository, SnapshotRepository};
pub use repo::{RepoError, RepoResult};
pub use runtime::autosave::AutosaveLoop;
pub use runtime::watchdog::{
    ProcessTerminator, Terminator, TrialClock, TrialWatchdog, WatchdogStatus,
    TRIAL_EXPIRED_NOTICE,
};
pub use service::note_store::{NoteStore, NoteStoreError, NoteStoreResult, PersistOutcome};
pub use session::SessionContext;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
