//! Player names
//!
//! Game servers treat player names case-insensitively. [`PlayerName`] keeps
//! the spelling it was created with but compares and hashes on the lowercase
//! form, so resolvers can key maps by it directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Longest name accepted by the usual game-name validation.
///
/// Only a fast-path filter; hosts with longer names configure a larger bound.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 16;

/// A case-insensitive player name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the name could belong to a player at all.
    ///
    /// Empty names, names longer than `max_len` characters and names
    /// containing a space are never valid, so lookups for them can be skipped.
    pub fn is_plausible(&self, max_len: usize) -> bool {
        !self.0.is_empty() && self.0.chars().count() <= max_len && !self.0.contains(' ')
    }

    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for PlayerName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PlayerName {}

impl Hash for PlayerName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self(value)
    }
}
