use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::mcp::FunctionDispatcher;
use crate::registry::AgentRegistry;
use crate::workflow::WorkflowEngine;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Registered agent fleet
    pub registry: AgentRegistry,

    /// Workflow engine driving multi-step executions
    pub engine: WorkflowEngine,

    /// MCP function dispatcher
    pub dispatcher: Arc<FunctionDispatcher>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        registry: AgentRegistry,
        engine: WorkflowEngine,
        dispatcher: Arc<FunctionDispatcher>,
    ) -> Self {
        Self {
            registry,
            engine,
            dispatcher,
            start_time: Utc::now(),
        }
    }

    /// Get service uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
