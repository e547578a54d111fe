//! API Module
//!
//! HTTP handlers and routing for the member cache REST API.
//!
//! # Endpoints
//! - `POST /members` - Cache one member
//! - `POST /members/bulk` - Cache several members
//! - `GET /members/:id` - Read one member
//! - `GET /members?start=&count=` - Read a range of members
//! - `GET /stats` - Per-node statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
