//! API Routes
//!
//! Maps member cache endpoints onto their handlers.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_member_handler, create_members_handler, get_member_handler, get_members_handler,
    health_handler, stats_handler, AppState,
};

/// Builds the router over shared state.
///
/// Every origin is allowed and each request is traced through `tower_http`.
/// `/members/bulk` is a static segment and wins over `/members/:id`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let members = Router::new()
        .route(
            "/members",
            post(create_member_handler).get(get_members_handler),
        )
        .route("/members/bulk", post(create_members_handler))
        .route("/members/:id", get(get_member_handler));

    let ops = Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    members
        .merge(ops)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
