//! Request DTOs for the member cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Maximum accepted member name length in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Default page size for bulk reads
pub const DEFAULT_BULK_COUNT: i64 = 10;

/// Request body for caching one member (POST /members)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberRequest {
    /// Member id
    pub id: i64,
    /// Member name
    pub name: String,
}

impl CreateMemberRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some(format!("Name of member {} cannot be empty", self.id));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name of member {} exceeds maximum length of {} bytes",
                self.id, MAX_NAME_LENGTH
            ));
        }
        None
    }
}

/// Query string for bulk reads (GET /members?start=&count=)
#[derive(Debug, Clone, Deserialize)]
pub struct BulkQuery {
    /// Offset into the id range; the first id returned is `start + 1`
    #[serde(default)]
    pub start: i64,
    /// Number of members to return
    #[serde(default = "default_count")]
    pub count: i64,
}

fn default_count() -> i64 {
    DEFAULT_BULK_COUNT
}
