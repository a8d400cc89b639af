//! Authenticated owner identity.
//!
//! # Responsibility
//! - Validate usernames before they are used to derive file names.
//!
//! # Invariants
//! - 1..=64 characters from `[A-Za-z0-9_.-]`.
//! - Never `.` or `..`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static OWNER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,64}$").expect("valid owner regex"));

/// Rejected owner identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerError(pub String);

impl Display for OwnerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid username `{}`: use 1-64 letters, digits, `_`, `-` or `.`",
            self.0
        )
    }
}

impl Error for OwnerError {}

/// Validated username owning one note store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Owner(String);

impl Owner {
    pub fn parse(value: &str) -> Result<Self, OwnerError> {
        let trimmed = value.trim();
        if trimmed == "." || trimmed == ".." || !OWNER_RE.is_match(trimmed) {
            return Err(OwnerError(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
