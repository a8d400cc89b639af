//! Session gate: flat username/password lookup.
//!
//! # Responsibility
//! - Load and persist `users.json` (username -> `{ "password": ... }`).
//! - Register new users and check credentials by plain equality.
//! - Produce the `SessionContext` the note store is built from.
//!
//! # Invariants
//! - Usernames are validated as `Owner` before they are stored.
//! - Registration never overwrites an existing user.
//! - The credentials file is replaced atomically.

use crate::logging::sanitize_message;
use crate::model::owner::{Owner, OwnerError};
use crate::repo::atomic_file::write_atomic;
use crate::repo::RepoError;
use crate::session::SessionContext;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MAX_LOGGED_USERNAME_CHARS: usize = 64;

#[derive(Debug)]
pub enum CredentialError {
    InvalidOwner(OwnerError),
    UserExists(String),
    Corrupt { path: PathBuf, message: String },
    Io(RepoError),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOwner(err) => write!(f, "{err}"),
            Self::UserExists(name) => write!(f, "user `{name}` already exists"),
            Self::Corrupt { path, message } => {
                write!(f, "corrupt credentials file `{}`: {message}", path.display())
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidOwner(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UserExists(_) | Self::Corrupt { .. } => None,
        }
    }
}

impl From<OwnerError> for CredentialError {
    fn from(value: OwnerError) -> Self {
        Self::InvalidOwner(value)
    }
}

impl From<RepoError> for CredentialError {
    fn from(value: RepoError) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CredentialRecord {
    password: String,
}

/// File-backed credential map.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    users: BTreeMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// Loads credentials from `path`; a missing file means no users yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let users: BTreeMap<String, CredentialRecord> = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|err| CredentialError::Corrupt {
                path: path.clone(),
                message: err.to_string(),
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(RepoError::io(&path, err).into()),
        };
        Ok(Self { path, users })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username.trim())
    }

    /// Adds a user and persists the file.
    pub fn register(&mut self, username: &str, password: &str) -> Result<Owner, CredentialError> {
        let owner = Owner::parse(username)?;
        if self.users.contains_key(owner.as_str()) {
            warn!("event=user_register module=auth status=exists owner={owner}");
            return Err(CredentialError::UserExists(owner.to_string()));
        }

        self.users.insert(
            owner.to_string(),
            CredentialRecord {
                password: password.to_string(),
            },
        );
        if let Err(err) = self.save() {
            self.users.remove(owner.as_str());
            return Err(err);
        }

        info!("event=user_register module=auth status=ok owner={owner}");
        Ok(owner)
    }

    /// Returns the owner when `username` exists and `password` matches.
    pub fn login(&self, username: &str, password: &str) -> Option<Owner> {
        let Ok(owner) = Owner::parse(username) else {
            warn!(
                "event=user_login module=auth status=denied reason=invalid_username username={:?}",
                sanitize_message(username, MAX_LOGGED_USERNAME_CHARS)
            );
            return None;
        };
        match self.users.get(owner.as_str()) {
            Some(record) if record.password == password => {
                info!("event=user_login module=auth status=ok owner={owner}");
                Some(owner)
            }
            _ => {
                warn!("event=user_login module=auth status=denied owner={owner}");
                None
            }
        }
    }

    /// `login` followed by session creation.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<SessionContext> {
        self.login(username, password).map(SessionContext::new)
    }

    fn save(&self) -> Result<(), CredentialError> {
        let payload = serde_json::to_vec_pretty(&self.users)
            .map_err(|err| RepoError::Serialize(err.to_string()))?;
        write_atomic(&self.path, &payload)?;
        Ok(())
    }
}
