//! Durable persistence for note snapshots.
//!
//! # Responsibility
//! - Define the snapshot load/save contract used by the note store.
//! - Keep file layout and JSON details behind that contract.
//!
//! # Invariants
//! - A failed save leaves the previous on-disk snapshot intact.
//! - Unparsable snapshots surface as `CorruptSnapshot`, never as empty data.

pub(crate) mod atomic_file;
pub mod snapshot_repo;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for snapshot load/save.
#[derive(Debug)]
pub enum RepoError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    CorruptSnapshot {
        path: PathBuf,
        message: String,
    },
    Serialize(String),
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io_failed",
            Self::CorruptSnapshot { .. } => "corrupt_snapshot",
            Self::Serialize(_) => "serialize_failed",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::CorruptSnapshot { path, message } => {
                write!(f, "corrupt snapshot `{}`: {message}", path.display())
            }
            Self::Serialize(message) => write!(f, "failed to serialize snapshot: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::CorruptSnapshot { .. } | Self::Serialize(_) => None,
        }
    }
}
