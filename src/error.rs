use thiserror::Error;

/// Main error type for the orchestration service
#[derive(Error, Debug)]
pub enum ConductorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Caller errors
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    // Lookup errors
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    // Registration races
    #[error("Agent already registered with a different descriptor: {0}")]
    DuplicateAgent(String),

    #[error("Workflow id collision: {0}")]
    DuplicateWorkflow(String),

    // Remote agent errors
    #[error("Remote task failed on agent {agent_id}: {message}")]
    RemoteTask { agent_id: String, message: String },

    #[error("Connectivity error talking to agent {agent_id}: {message}")]
    Connectivity { agent_id: String, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ConductorError {
    /// Machine-readable code surfaced in the MCP error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ConductorError::MissingParameter(_) => "MissingParameter",
            ConductorError::Validation(_) => "ValidationError",
            ConductorError::UnknownFunction(_) => "UnknownFunction",
            ConductorError::UnknownWorkflow(_) => "UnknownWorkflow",
            ConductorError::AgentNotFound(_) | ConductorError::WorkflowNotFound(_) => "NotFound",
            ConductorError::DuplicateAgent(_) => "DuplicateAgent",
            ConductorError::DuplicateWorkflow(_) => "DuplicateWorkflow",
            ConductorError::RemoteTask { .. } => "RemoteTaskError",
            ConductorError::Connectivity { .. } => "ConnectivityError",
            ConductorError::Config(_) => "ConfigError",
            _ => "InternalError",
        }
    }
}

/// Result type alias for ConductorError
pub type Result<T> = std::result::Result<T, ConductorError>;
