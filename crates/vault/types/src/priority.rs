//! Resolver priorities
//!
//! Higher priorities are queried first. The named constants are a
//! convention only: every `i8` value is a legal priority.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed byte priority of a registered resolver
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(i8);

impl Priority {
    pub const LOWEST: Priority = Priority(-96);
    pub const LOWER: Priority = Priority(-64);
    pub const LOW: Priority = Priority(-32);
    pub const NORMAL: Priority = Priority(0);
    pub const HIGH: Priority = Priority(31);
    pub const HIGHER: Priority = Priority(63);
    pub const HIGHEST: Priority = Priority(95);

    pub const fn new(value: i8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i8 {
        self.0
    }
}

impl From<i8> for Priority {
    fn from(value: i8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
