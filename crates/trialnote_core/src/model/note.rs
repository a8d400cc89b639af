//! Note record.

use serde::{Deserialize, Serialize};

/// One title/content pair.
///
/// `title` is the unique key inside a single store. Serialized with exactly
/// the `title` and `content` fields; unknown fields are rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Note {
    pub title: String,
    pub content: String,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
