//! Domain Module
//!
//! The record cached by this service and its storage key layout.

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Prefix of every member key stored on a node.
pub const MEMBER_KEY_PREFIX: &str = "member";

/// Name carried by placeholders substituted after a connection failure.
pub const CONNECTION_FAILURE_NAME: &str = "redis connection failure fallback";

/// Name carried by placeholders substituted after a command timeout.
pub const TIMEOUT_FAILURE_NAME: &str = "query timeout fallback";

// == Member ==
/// A cached member record. Equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    id: i64,
    name: String,
}

impl Member {
    /// Creates a member record.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Builds the degraded-mode placeholder for a failed node call.
    ///
    /// Returns `None` for errors that are not node failures.
    pub fn degraded(id: i64, err: &CacheError) -> Option<Self> {
        let name = match err {
            CacheError::BackendUnavailable(_) => CONNECTION_FAILURE_NAME,
            CacheError::BackendTimeout(_) => TIMEOUT_FAILURE_NAME,
            _ => return None,
        };
        Some(Self::new(id, name))
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which this member is stored on every node.
    pub fn cache_key(&self) -> String {
        member_key(self.id)
    }

    /// True when this record is a degraded-mode placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.name == CONNECTION_FAILURE_NAME || self.name == TIMEOUT_FAILURE_NAME
    }
}

/// Storage key for a member id.
pub fn member_key(id: i64) -> String {
    format!("{}:{}", MEMBER_KEY_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_key_layout() {
        assert_eq!(member_key(42), "member:42");
        assert_eq!(Member::new(7, "x").cache_key(), "member:7");
    }

    #[test]
    fn test_member_value_equality() {
        assert_eq!(Member::new(1, "A"), Member::new(1, "A"));
        assert_ne!(Member::new(1, "A"), Member::new(1, "B"));
        assert_ne!(Member::new(1, "A"), Member::new(2, "A"));
    }

    #[test]
    fn test_degraded_placeholder_names() {
        let unavailable = Member::degraded(3, &CacheError::BackendUnavailable("x".into())).unwrap();
        assert_eq!(unavailable.name(), CONNECTION_FAILURE_NAME);
        assert_eq!(unavailable.id(), 3);
        assert!(unavailable.is_placeholder());

        let timeout = Member::degraded(3, &CacheError::BackendTimeout("x".into())).unwrap();
        assert_eq!(timeout.name(), TIMEOUT_FAILURE_NAME);

        assert!(Member::degraded(3, &CacheError::Deserialization("x".into())).is_none());
    }
}
