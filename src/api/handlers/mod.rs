mod agents;
mod functions;
mod system;
mod workflows;

pub use agents::{get_agent_status, get_all_agents_status, register_agent};
pub use functions::execute_function;
pub use system::health_handler;
pub use workflows::{create_workflow, get_workflow_status};

use axum::http::StatusCode;

use crate::error::ConductorError;

/// HTTP status for an internal error surfaced on a REST endpoint
pub(crate) fn error_status(error: &ConductorError) -> StatusCode {
    match error {
        ConductorError::AgentNotFound(_) | ConductorError::WorkflowNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ConductorError::MissingParameter(_)
        | ConductorError::Validation(_)
        | ConductorError::UnknownFunction(_)
        | ConductorError::UnknownWorkflow(_) => StatusCode::BAD_REQUEST,
        ConductorError::DuplicateAgent(_) | ConductorError::DuplicateWorkflow(_) => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
