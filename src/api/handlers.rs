//! API Handlers
//!
//! HTTP request handlers for each member cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::NodeSet;
use crate::error::{CacheError, Result};
use crate::models::{
    BulkQuery, CreateMemberRequest, CreateMemberResult, HealthResponse, MemberResult,
    NodeStatsResponse, SuccessResponse,
};
use crate::service::MemberService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside member service
    pub service: Arc<MemberService>,
    /// Cache nodes, for statistics
    pub nodes: NodeSet,
}

impl AppState {
    pub fn new(service: Arc<MemberService>, nodes: NodeSet) -> Self {
        Self { service, nodes }
    }
}

/// Handler for POST /members
///
/// Caches one member on every node.
pub async fn create_member_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<CreateMemberResult>>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let id = state.service.set_one(req.id, req.name).await;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(CreateMemberResult::new(id))),
    ))
}

/// Handler for POST /members/bulk
///
/// Caches every member with one pipelined write per node.
pub async fn create_members_handler(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<CreateMemberRequest>>,
) -> Result<(StatusCode, Json<SuccessResponse<Vec<CreateMemberResult>>>)> {
    if let Some(error_msg) = reqs.iter().find_map(CreateMemberRequest::validate) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let records = reqs.into_iter().map(|req| (req.id, req.name)).collect();
    let ids = state.service.set_bulk(records).await;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(
            ids.into_iter().map(CreateMemberResult::new).collect(),
        )),
    ))
}

/// Handler for GET /members/:id
///
/// Always answers with a member: cached, loaded, or degraded placeholder.
pub async fn get_member_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<SuccessResponse<MemberResult>> {
    let member = state.service.get_or_load(id).await;
    Json(SuccessResponse::new(member.into()))
}

/// Handler for GET /members?start=&count=
pub async fn get_members_handler(
    State(state): State<AppState>,
    Query(query): Query<BulkQuery>,
) -> Result<Json<SuccessResponse<Vec<MemberResult>>>> {
    let members = state
        .service
        .get_or_load_bulk(query.start, query.count)
        .await?;

    Ok(Json(SuccessResponse::new(
        members.into_iter().map(MemberResult::from).collect(),
    )))
}

/// Handler for GET /stats
///
/// Returns per-node counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<Vec<NodeStatsResponse>> {
    Json(
        state
            .nodes
            .iter()
            .map(|node| NodeStatsResponse::new(node.index(), &node.stats()))
            .collect(),
    )
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.nodes.len()))
}
