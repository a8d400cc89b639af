//! Periodic snapshot flushing.

use crate::repo::snapshot_repo::SnapshotRepository;
use crate::service::note_store::{NoteStore, PersistOutcome};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const AUTOSAVE_THREAD_NAME: &str = "trialnote-autosave";

/// Calls `persist_now()` on a fixed period until the process exits.
pub struct AutosaveLoop<R: SnapshotRepository> {
    store: Arc<NoteStore<R>>,
    interval: Duration,
}

impl<R: SnapshotRepository + 'static> AutosaveLoop<R> {
    pub fn new(store: Arc<NoteStore<R>>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs one persist attempt.
    ///
    /// Failures are logged and swallowed; `None` means this tick failed and
    /// the next tick retries.
    pub fn tick(&self) -> Option<PersistOutcome> {
        match self.store.persist_now() {
            Ok(outcome) => {
                debug!(
                    "event=autosave_tick module=runtime status=ok owner={} outcome={outcome:?}",
                    self.store.owner()
                );
                Some(outcome)
            }
            Err(err) => {
                warn!(
                    "event=autosave_tick module=runtime status=error owner={} retry_in_ms={} error={err}",
                    self.store.owner(),
                    self.interval.as_millis()
                );
                None
            }
        }
    }

    /// Moves the loop onto a detached background thread.
    ///
    /// The thread sleeps first, so the first save happens one interval
    /// after start.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(AUTOSAVE_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    fn run(&self) {
        loop {
            thread::sleep(self.interval);
            self.tick();
        }
    }
}
