//! Per-session context handed from the session gate to the note store.
//!
//! Replaces process-global user state: everything session-scoped travels
//! through this value.

use crate::model::owner::Owner;
use std::time::Instant;
use uuid::Uuid;

/// Identity and timing of one authenticated session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    owner: Owner,
    session_id: Uuid,
    started_at: Instant,
}

impl SessionContext {
    /// Starts a new session for an already-authenticated `owner`.
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            session_id: Uuid::new_v4(),
            started_at: Instant::now(),
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Random id correlating all log lines of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Monotonic start instant; the trial clock is anchored here.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}
