//! Strongly-typed identifiers for vault registrations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the component that owns a resolver registration.
///
/// Conceptually "which plugin" registered the resolver. At most one active
/// registration exists per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner:{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of one successful registration.
///
/// Issued in increasing order, so it doubles as the insertion index used to
/// break priority ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(u64);

impl RegistrationId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_display() {
        let owner = OwnerId::new("com.example.AuthPlugin");
        assert_eq!(owner.to_string(), "owner:com.example.AuthPlugin");
        assert_eq!(owner.as_str(), "com.example.AuthPlugin");
    }

    #[test]
    fn test_registration_ids_order_by_issue() {
        let first = RegistrationId::from_raw(1);
        let second = RegistrationId::from_raw(2);
        assert!(first < second);
        assert_eq!(second.to_string(), "registration:2");
    }
}
