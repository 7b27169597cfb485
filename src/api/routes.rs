use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness
        .route("/health", get(handlers::health_handler))
        // Agent status endpoints
        .route("/api/v1/mcp/status/agents", get(handlers::get_all_agents_status))
        .route(
            "/api/v1/mcp/status/agent/:agent_id",
            get(handlers::get_agent_status),
        )
        .route("/api/v1/mcp/agent/register", post(handlers::register_agent))
        // MCP function endpoint
        .route("/api/v1/mcp/function", post(handlers::execute_function))
        // Workflow endpoints
        .route("/api/v1/mcp/workflow", post(handlers::create_workflow))
        .route(
            "/api/v1/mcp/workflow/:workflow_id",
            get(handlers::get_workflow_status),
        )
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
