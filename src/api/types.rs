use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{AgentStatusView, SystemHealth};

// ============================================================================
// Health Check Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: i64,
}

// ============================================================================
// Agent Status Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetStatusResponse {
    pub agents: Vec<AgentStatusView>,
    pub system_health: SystemHealth,
}

// ============================================================================
// Function Call Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCallRequest {
    pub function_name: String,
    #[serde(default)]
    pub arguments: Value,
}

// ============================================================================
// Workflow Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRequest {
    pub workflow_name: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCreatedResponse {
    pub workflow_id: String,
    pub status: crate::workflow::WorkflowStatus,
}
