use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::{
    auth::ensure_authorized,
    handlers::error_status,
    state::AppState,
    types::FleetStatusResponse,
};
use crate::registry::{Agent, AgentDescriptor, AgentStatusView};

/// GET /api/v1/mcp/status/agents
pub async fn get_all_agents_status(State(state): State<AppState>) -> Json<FleetStatusResponse> {
    let agents = state
        .registry
        .list_all()
        .await
        .iter()
        .map(AgentStatusView::from)
        .collect();
    let system_health = state.registry.system_health().await;

    Json(FleetStatusResponse {
        agents,
        system_health,
    })
}

/// GET /api/v1/mcp/status/agent/:agent_id
pub async fn get_agent_status(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> std::result::Result<Json<AgentStatusView>, (StatusCode, String)> {
    let agent = state
        .registry
        .get(&agent_id)
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;
    Ok(Json(AgentStatusView::from(&agent)))
}

/// POST /api/v1/mcp/agent/register
pub async fn register_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(descriptor): Json<AgentDescriptor>,
) -> std::result::Result<Json<Agent>, (StatusCode, String)> {
    ensure_authorized(&headers)?;
    let agent = state
        .registry
        .register(descriptor)
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;
    Ok(Json(agent))
}
