//! Snapshot repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Load and save one owner's full note sequence.
//! - Move unreadable snapshots aside on request.
//!
//! # Invariants
//! - One file per owner: `notes_<owner>.json` under the data directory.
//! - File content is a JSON array of `{ "title", "content" }` objects in
//!   store order; save -> load round-trips exactly.
//! - Saves go through `write_atomic`.
//! - A snapshot repeating a title is treated as corrupt.

use super::atomic_file::write_atomic;
use super::{RepoError, RepoResult};
use crate::model::note::Note;
use crate::model::owner::Owner;
use log::{debug, warn};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SNAPSHOT_FILE_PREFIX: &str = "notes_";
const SNAPSHOT_FILE_EXT: &str = "json";

/// Durable storage for note snapshots.
///
/// Implementations must be shareable with the autosave thread.
pub trait SnapshotRepository: Send + Sync {
    /// Reads the owner's snapshot; absent snapshot yields an empty sequence.
    fn load(&self, owner: &Owner) -> RepoResult<Vec<Note>>;
    /// Overwrites the owner's snapshot with `notes`.
    fn save(&self, owner: &Owner, notes: &[Note]) -> RepoResult<()>;
    /// Moves an unreadable snapshot out of the way and returns where it went.
    fn quarantine(&self, owner: &Owner) -> RepoResult<Option<PathBuf>>;
}

/// Snapshot repository writing pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    data_dir: PathBuf,
}

impl JsonSnapshotRepository {
    /// Creates a repository rooted at `data_dir`, creating it if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> RepoResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|err| RepoError::io(&data_dir, err))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the snapshot file for `owner`.
    pub fn snapshot_path(&self, owner: &Owner) -> PathBuf {
        self.data_dir.join(format!(
            "{SNAPSHOT_FILE_PREFIX}{}.{SNAPSHOT_FILE_EXT}",
            owner.as_str()
        ))
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self, owner: &Owner) -> RepoResult<Vec<Note>> {
        let path = self.snapshot_path(owner);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("event=snapshot_load module=repo status=absent owner={owner}");
                return Ok(Vec::new());
            }
            Err(err) => return Err(RepoError::io(&path, err)),
        };

        let notes: Vec<Note> =
            serde_json::from_slice(&raw).map_err(|err| RepoError::CorruptSnapshot {
                path: path.clone(),
                message: err.to_string(),
            })?;
        if let Some(title) = first_duplicate_title(&notes) {
            return Err(RepoError::CorruptSnapshot {
                path,
                message: format!("duplicate title {title:?}"),
            });
        }
        debug!(
            "event=snapshot_load module=repo status=ok owner={owner} notes={}",
            notes.len()
        );
        Ok(notes)
    }

    fn save(&self, owner: &Owner, notes: &[Note]) -> RepoResult<()> {
        let payload =
            serde_json::to_vec_pretty(notes).map_err(|err| RepoError::Serialize(err.to_string()))?;
        write_atomic(&self.snapshot_path(owner), &payload)
    }

    fn quarantine(&self, owner: &Owner) -> RepoResult<Option<PathBuf>> {
        let path = self.snapshot_path(owner);
        if !path.exists() {
            return Ok(None);
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut target = path.clone().into_os_string();
        target.push(format!(".corrupt-{stamp}"));
        let target = PathBuf::from(target);

        std::fs::rename(&path, &target).map_err(|err| RepoError::io(&path, err))?;
        warn!(
            "event=snapshot_quarantine module=repo status=ok owner={owner} moved_to={}",
            target.display()
        );
        Ok(Some(target))
    }
}

fn first_duplicate_title(notes: &[Note]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(notes.len());
    notes
        .iter()
        .map(|note| note.title.as_str())
        .find(|title| !seen.insert(*title))
}

#[cfg(test)]
mod tests {
    use super::{JsonSnapshotRepository, SnapshotRepository};
    use crate::model::owner::Owner;

    #[test]
    fn snapshot_path_is_derived_from_owner() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
        let owner = Owner::parse("alice").unwrap();
        assert_eq!(
            repo.snapshot_path(&owner),
            dir.path().join("notes_alice.json")
        );
    }

    #[test]
    fn quarantine_without_snapshot_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepository::open(dir.path()).unwrap();
        let owner = Owner::parse("nobody").unwrap();
        assert_eq!(repo.quarantine(&owner).unwrap(), None);
    }
}
