use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::info;

use crate::api::{auth::ensure_authorized, state::AppState, types::FunctionCallRequest};
use crate::mcp::FunctionResponse;

/// POST /api/v1/mcp/function
///
/// Always answers with the uniform envelope; dispatch failures are data,
/// not HTTP errors.
pub async fn execute_function(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FunctionCallRequest>,
) -> std::result::Result<Json<FunctionResponse>, (StatusCode, String)> {
    ensure_authorized(&headers)?;
    info!("Executing function: {}", request.function_name);
    let response = state
        .dispatcher
        .dispatch(&request.function_name, request.arguments)
        .await;
    Ok(Json(response))
}
