//! API Routes
//!
//! HTTP endpoints exposed by the service:
//! - `POST /repurpose` - Run the full evaluation pipeline
//! - `GET /repurpose` - Same pipeline, query-string variant
//! - `GET /api/health` - Liveness probe

pub mod health;
pub mod repurpose;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the application router with CORS and request tracing applied.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(repurpose::router(state))
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
