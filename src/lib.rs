pub mod a2a;
pub mod api;
pub mod config;
pub mod error;
pub mod mcp;
pub mod monitor;
pub mod registry;
pub mod workflow;

pub use a2a::{HttpTaskClient, TaskDispatch, TaskOutcome, TaskStatus};
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::{ConductorError, Result};
pub use mcp::{FunctionDispatcher, FunctionResponse};
pub use monitor::HealthMonitor;
pub use registry::{Agent, AgentDescriptor, AgentHealth, AgentRegistry, SystemHealth};
pub use workflow::{Workflow, WorkflowEngine, WorkflowStatus, WorkflowStore};
