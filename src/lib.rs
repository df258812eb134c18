// Repurpose-Rx - drug repurposing evaluation service

pub mod agents;
pub mod config;
pub mod data;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod scoring;
pub mod sources;
pub mod types;
pub mod utils;
pub mod verdict;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
