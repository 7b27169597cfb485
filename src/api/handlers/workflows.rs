use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::{
    auth::ensure_authorized,
    handlers::error_status,
    state::AppState,
    types::{WorkflowCreatedResponse, WorkflowRequest},
};
use crate::workflow::Workflow;

/// POST /api/v1/mcp/workflow
pub async fn create_workflow(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<WorkflowRequest>,
) -> std::result::Result<Json<WorkflowCreatedResponse>, (StatusCode, String)> {
    ensure_authorized(&headers)?;
    let workflow = state
        .engine
        .execute_workflow(&request.workflow_name, request.parameters)
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;

    Ok(Json(WorkflowCreatedResponse {
        workflow_id: workflow.workflow_id,
        status: workflow.status,
    }))
}

/// GET /api/v1/mcp/workflow/:workflow_id
pub async fn get_workflow_status(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> std::result::Result<Json<Workflow>, (StatusCode, String)> {
    let workflow = state
        .engine
        .get_workflow_status(&workflow_id)
        .await
        .map_err(|e| (error_status(&e), e.to_string()))?;
    Ok(Json(workflow))
}
