//! Response DTOs for the member cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::domain::Member;

/// Envelope wrapping every successful response
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    /// Always "success"
    pub status: String,
    /// Response payload
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

/// Result of caching one member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberResult {
    pub member_id: i64,
}

impl CreateMemberResult {
    pub fn new(member_id: i64) -> Self {
        Self { member_id }
    }
}

/// A member as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResult {
    pub member_id: i64,
    pub name: String,
}

impl From<Member> for MemberResult {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.id(),
            name: member.name().to_string(),
        }
    }
}

/// Counters of one node (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatsResponse {
    /// Node index
    pub node: usize,
    pub hits: u64,
    pub misses: u64,
    pub early_expirations: u64,
    pub errors: u64,
    pub writes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl NodeStatsResponse {
    pub fn new(node: usize, stats: &CacheStats) -> Self {
        Self {
            node,
            hits: stats.hits,
            misses: stats.misses,
            early_expirations: stats.early_expirations,
            errors: stats.errors,
            writes: stats.writes,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Number of configured cache nodes
    pub nodes: usize,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(nodes: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            nodes,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_result_serializes_camel_case() {
        let resp = SuccessResponse::new(CreateMemberResult::new(7));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["memberId"], 7);
    }

    #[test]
    fn test_member_result_from_member() {
        let result = MemberResult::from(Member::new(1, "A"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["memberId"], 1);
        assert_eq!(json["name"], "A");
    }

    #[test]
    fn test_node_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = NodeStatsResponse::new(2, &stats);
        assert_eq!(resp.node, 2);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(3);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
