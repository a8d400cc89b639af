//! Thread-safe note store for one authenticated owner.
//!
//! # Responsibility
//! - Own the in-memory, insertion-ordered note sequence.
//! - Serialize add/remove/edit/list/persist through a single lock.
//! - Hand consistent snapshots to the repository for autosave.
//!
//! # Invariants
//! - No two notes share a title whenever the lock is not held.
//! - `list()` returns an owned copy, never a live view.
//! - Mutations never touch disk; persistence happens only in
//!   `persist_now()`.
//! - The note lock is never held across repository I/O. A separate save
//!   gate orders concurrent persists so an older snapshot cannot overwrite
//!   a newer one.

use crate::config::CorruptSnapshotPolicy;
use crate::logging::{sanitize_message, MAX_LOGGED_TITLE_CHARS};
use crate::model::note::Note;
use crate::model::owner::Owner;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::repo::RepoError;
use crate::session::SessionContext;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Recoverable note store failure.
#[derive(Debug)]
pub enum NoteStoreError {
    /// `add` with a title that already exists. Nothing was changed.
    DuplicateTitle(String),
    /// `edit` on a title that does not exist. Nothing was changed.
    NotFound(String),
    /// Snapshot load/save failure.
    Repo(RepoError),
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTitle(title) => write!(f, "a note titled `{title}` already exists"),
            Self::NotFound(title) => write!(f, "no note titled `{title}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteStoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of one `persist_now()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Snapshot written with this many notes.
    Written { notes: usize },
    /// No mutation since the last successful save; disk untouched.
    Unchanged,
}

struct NoteState {
    notes: Vec<Note>,
    /// Bumped on every effective mutation.
    revision: u64,
}

/// In-memory note collection backed by a snapshot repository.
pub struct NoteStore<R: SnapshotRepository> {
    ctx: SessionContext,
    repo: R,
    state: Mutex<NoteState>,
    /// Revision of the last successfully written snapshot.
    save_gate: Mutex<u64>,
}

impl<R: SnapshotRepository> NoteStore<R> {
    /// Loads the owner's snapshot and returns a ready store.
    ///
    /// # Errors
    /// - `Repo(CorruptSnapshot)` under `CorruptSnapshotPolicy::Fail`.
    /// - `Repo(Io)` when the snapshot exists but cannot be read, or when
    ///   quarantining a corrupt snapshot fails.
    pub fn open(
        ctx: SessionContext,
        repo: R,
        policy: CorruptSnapshotPolicy,
    ) -> NoteStoreResult<Self> {
        let owner = ctx.owner().clone();
        let notes = match repo.load(&owner) {
            Ok(notes) => notes,
            Err(err @ RepoError::CorruptSnapshot { .. }) => match policy {
                CorruptSnapshotPolicy::Fail => {
                    error!(
                        "event=store_open module=store status=error owner={owner} error_code={} error={err}",
                        err.code()
                    );
                    return Err(err.into());
                }
                CorruptSnapshotPolicy::ResetToEmpty => {
                    error!(
                        "event=store_open module=store status=reset owner={owner} error_code={} error={err}",
                        err.code()
                    );
                    repo.quarantine(&owner)?;
                    Vec::new()
                }
            },
            Err(err) => {
                error!(
                    "event=store_open module=store status=error owner={owner} error_code={} error={err}",
                    err.code()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=store_open module=store status=ok owner={owner} session={} notes={}",
            ctx.session_id(),
            notes.len()
        );

        Ok(Self {
            ctx,
            repo,
            state: Mutex::new(NoteState { notes, revision: 0 }),
            save_gate: Mutex::new(0),
        })
    }

    pub fn owner(&self) -> &Owner {
        self.ctx.owner()
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    /// Appends a note unless `title` is already taken.
    pub fn add(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteStoreResult<()> {
        let title = title.into();
        let mut state = self.state.lock();
        if state.notes.iter().any(|note| note.title == title) {
            drop(state);
            warn!(
                "event=note_add module=store status=duplicate owner={} title={}",
                self.owner(),
                loggable_title(&title)
            );
            return Err(NoteStoreError::DuplicateTitle(title));
        }

        state.notes.push(Note::new(title.as_str(), content));
        state.revision += 1;
        drop(state);

        info!(
            "event=note_add module=store status=ok owner={} title={}",
            self.owner(),
            loggable_title(&title)
        );
        Ok(())
    }

    /// Removes every note titled `title` and returns how many were removed.
    ///
    /// Removing an absent title is a no-op returning `0`.
    pub fn remove(&self, title: &str) -> usize {
        let mut state = self.state.lock();
        let before = state.notes.len();
        state.notes.retain(|note| note.title != title);
        let removed = before - state.notes.len();
        if removed > 0 {
            state.revision += 1;
        }
        drop(state);

        info!(
            "event=note_remove module=store status=ok owner={} title={} removed={removed}",
            self.owner(),
            loggable_title(title)
        );
        removed
    }

    /// Replaces the content of the note titled `title`.
    pub fn edit(&self, title: &str, new_content: impl Into<String>) -> NoteStoreResult<()> {
        let mut state = self.state.lock();
        let position = state.notes.iter().position(|note| note.title == title);
        let Some(index) = position else {
            drop(state);
            warn!(
                "event=note_edit module=store status=not_found owner={} title={}",
                self.owner(),
                loggable_title(title)
            );
            return Err(NoteStoreError::NotFound(title.to_string()));
        };

        state.notes[index].content = new_content.into();
        state.revision += 1;
        drop(state);

        info!(
            "event=note_edit module=store status=ok owner={} title={}",
            self.owner(),
            loggable_title(title)
        );
        Ok(())
    }

    /// Returns a copy of all notes in insertion order.
    pub fn list(&self) -> Vec<Note> {
        self.state.lock().notes.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().notes.is_empty()
    }

    /// Writes the current notes through the repository.
    ///
    /// Skips the write when nothing changed since the last successful save.
    /// On failure the in-memory state is untouched and the next call retries.
    pub fn persist_now(&self) -> NoteStoreResult<PersistOutcome> {
        let mut persisted_revision = self.save_gate.lock();
        let (notes, revision) = {
            let state = self.state.lock();
            if state.revision == *persisted_revision {
                return Ok(PersistOutcome::Unchanged);
            }
            (state.notes.clone(), state.revision)
        };

        if let Err(err) = self.repo.save(self.owner(), &notes) {
            warn!(
                "event=snapshot_save module=store status=error owner={} error_code={} error={err}",
                self.owner(),
                err.code()
            );
            return Err(err.into());
        }

        *persisted_revision = revision;
        info!(
            "event=snapshot_save module=store status=ok owner={} notes={} revision={revision}",
            self.owner(),
            notes.len()
        );
        Ok(PersistOutcome::Written { notes: notes.len() })
    }
}

fn loggable_title(title: &str) -> String {
    format!("{:?}", sanitize_message(title, MAX_LOGGED_TITLE_CHARS))
}
