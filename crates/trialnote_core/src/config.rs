//! Runtime configuration.
//!
//! # Invariants
//! - `validate()` must pass before any background task is started.
//! - Autosave interval bounds snapshot staleness; trial duration bounds
//!   total session lifetime (observed at watchdog granularity).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TRIAL_DURATION: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(60);
pub const CREDENTIALS_FILE_NAME: &str = "users.json";

/// What to do when the owner's snapshot cannot be parsed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptSnapshotPolicy {
    /// Refuse to open the store and report the error.
    #[default]
    Fail,
    /// Move the unreadable file aside, log it, and start with no notes.
    ResetToEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
    ZeroDuration(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data directory cannot be empty"),
            Self::ZeroDuration(field) => write!(f, "`{field}` must be greater than zero"),
        }
    }
}

impl Error for ConfigError {}

/// Application settings assembled by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `users.json` and per-owner snapshots.
    pub data_dir: PathBuf,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub autosave_interval: Duration,
    pub trial_duration: Duration,
    pub watchdog_interval: Duration,
    pub corrupt_snapshot_policy: CorruptSnapshotPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            log_dir: None,
            log_level: crate::logging::default_log_level().to_string(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            trial_duration: DEFAULT_TRIAL_DURATION,
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
            corrupt_snapshot_policy: CorruptSnapshotPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        for (field, value) in [
            ("autosave_interval", self.autosave_interval),
            ("trial_duration", self.trial_duration),
            ("watchdog_interval", self.watchdog_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(field));
            }
        }
        Ok(())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE_NAME)
    }
}
