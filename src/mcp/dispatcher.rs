//! Function dispatcher
//!
//! Single translation boundary between the internal error taxonomy and the
//! external `{status, result?, error?}` envelope. Incoming calls are parsed
//! into a closed set of function kinds, each with typed arguments; adding a
//! function means adding a variant, not reflecting over names.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::a2a::client::TaskDispatch;
use crate::a2a::types::codes;
use crate::error::{ConductorError, Result};
use crate::registry::{AgentRegistry, AgentStatusView};
use crate::workflow::WorkflowEngine;

/// Names accepted by `FunctionCall::parse`, in the order reported back to
/// callers of unknown functions.
pub const FUNCTION_NAMES: &[&str] = &[
    "get_agent_status",
    "execute_workflow",
    "get_workflow_status",
    "execute_market_analysis",
    "execute_trade",
    "assess_risk",
    "generate_report",
];

/// A parsed MCP call with typed arguments
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCall {
    GetAgentStatus { agent_id: Option<String> },
    ExecuteWorkflow { workflow_name: String, parameters: Value },
    GetWorkflowStatus { workflow_id: String },
    /// Single-task delegates: hand the arguments to the agent declaring the
    /// relevant capability
    ExecuteMarketAnalysis { arguments: Value },
    ExecuteTrade { arguments: Value },
    AssessRisk { arguments: Value },
    GenerateReport { arguments: Value },
}

impl FunctionCall {
    pub fn parse(function_name: &str, arguments: Value) -> Result<Self> {
        match function_name {
            "get_agent_status" => Ok(FunctionCall::GetAgentStatus {
                agent_id: optional_string(&arguments, "agent_id")?,
            }),
            "execute_workflow" => Ok(FunctionCall::ExecuteWorkflow {
                workflow_name: required_string(&arguments, "workflow_name")?,
                parameters: object_or_default(&arguments, "parameters")?,
            }),
            "get_workflow_status" => Ok(FunctionCall::GetWorkflowStatus {
                workflow_id: required_string(&arguments, "workflow_id")?,
            }),
            "execute_market_analysis" => Ok(FunctionCall::ExecuteMarketAnalysis { arguments }),
            "execute_trade" => Ok(FunctionCall::ExecuteTrade { arguments }),
            "assess_risk" => Ok(FunctionCall::AssessRisk { arguments }),
            "generate_report" => Ok(FunctionCall::GenerateReport { arguments }),
            other => Err(ConductorError::UnknownFunction(format!(
                "'{}' is not a known function; available: {}",
                other,
                FUNCTION_NAMES.join(", ")
            ))),
        }
    }
}

fn required_string(arguments: &Value, key: &str) -> Result<String> {
    match arguments.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(ConductorError::Validation(format!(
            "{key} must be a non-empty string"
        ))),
        None => Err(ConductorError::MissingParameter(key.to_string())),
    }
}

fn optional_string(arguments: &Value, key: &str) -> Result<Option<String>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConductorError::Validation(format!("{key} must be a string"))),
    }
}

fn object_or_default(arguments: &Value, key: &str) -> Result<Value> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(json!({})),
        Some(obj @ Value::Object(_)) => Ok(obj.clone()),
        Some(_) => Err(ConductorError::Validation(format!(
            "{key} must be an object"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Uniform success/error envelope returned for every MCP call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl FunctionResponse {
    pub fn success(result: Value) -> Self {
        Self {
            status: ResponseStatus::Success,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &ConductorError) -> Self {
        Self {
            status: ResponseStatus::Error,
            result: None,
            error: Some(ErrorBody {
                code: error.code().to_string(),
                message: error.to_string(),
            }),
        }
    }
}

pub struct FunctionDispatcher {
    registry: AgentRegistry,
    engine: WorkflowEngine,
    client: Arc<dyn TaskDispatch>,
}

impl FunctionDispatcher {
    pub fn new(
        registry: AgentRegistry,
        engine: WorkflowEngine,
        client: Arc<dyn TaskDispatch>,
    ) -> Self {
        Self {
            registry,
            engine,
            client,
        }
    }

    /// Dispatch a named call. Always returns the envelope; no internal
    /// error type crosses this boundary.
    pub async fn dispatch(&self, function_name: &str, arguments: Value) -> FunctionResponse {
        debug!("Dispatching MCP function {}", function_name);
        match self.try_dispatch(function_name, arguments).await {
            Ok(result) => FunctionResponse::success(result),
            Err(error) => FunctionResponse::failure(&error),
        }
    }

    async fn try_dispatch(&self, function_name: &str, arguments: Value) -> Result<Value> {
        match FunctionCall::parse(function_name, arguments)? {
            FunctionCall::GetAgentStatus { agent_id } => self.agent_status(agent_id).await,
            FunctionCall::ExecuteWorkflow {
                workflow_name,
                parameters,
            } => {
                let workflow = self.engine.execute_workflow(&workflow_name, parameters).await?;
                Ok(json!({
                    "workflow_id": workflow.workflow_id,
                    "status": workflow.status,
                }))
            }
            FunctionCall::GetWorkflowStatus { workflow_id } => {
                let workflow = self.engine.get_workflow_status(&workflow_id).await?;
                Ok(serde_json::to_value(workflow)?)
            }
            FunctionCall::ExecuteMarketAnalysis { arguments } => {
                self.delegate("market_analysis", arguments).await
            }
            FunctionCall::ExecuteTrade { arguments } => {
                self.delegate("execute_trade", arguments).await
            }
            FunctionCall::AssessRisk { arguments } => {
                // Pair-level risk checks go to the trade-risk capability,
                // everything else to the portfolio monitor
                let capability = if arguments.get("crypto_pair").is_some() {
                    "assess_trade_risk"
                } else {
                    "monitor_portfolio_risk"
                };
                self.delegate(capability, arguments).await
            }
            FunctionCall::GenerateReport { arguments } => {
                let capability = if arguments.get("time_period").is_some() {
                    "generate_performance_report"
                } else {
                    "generate_portfolio_valuation"
                };
                self.delegate(capability, arguments).await
            }
        }
    }

    async fn agent_status(&self, agent_id: Option<String>) -> Result<Value> {
        match agent_id {
            Some(id) => {
                let agent = self.registry.get(&id).await?;
                Ok(serde_json::to_value(AgentStatusView::from(&agent))?)
            }
            None => {
                let agents: Vec<AgentStatusView> = self
                    .registry
                    .list_all()
                    .await
                    .iter()
                    .map(AgentStatusView::from)
                    .collect();
                let system_health = self.registry.system_health().await;
                Ok(json!({
                    "agents": agents,
                    "system_health": system_health,
                }))
            }
        }
    }

    /// Send one task to the agent declaring `capability` and surface the
    /// outcome through the envelope.
    async fn delegate(&self, capability: &str, arguments: Value) -> Result<Value> {
        let agent = self
            .registry
            .agent_for_capability(capability)
            .await
            .ok_or_else(|| {
                ConductorError::AgentNotFound(format!("no agent declares capability {capability}"))
            })?;

        let outcome = self.client.send_task(&agent, capability, arguments).await;
        if outcome.is_success() {
            return Ok(json!({
                "task_id": outcome.task_id,
                "status": outcome.status,
                "agent_id": agent.agent_id,
                "result": outcome.result,
            }));
        }

        let error = outcome
            .error
            .unwrap_or_else(|| crate::a2a::types::TaskError::new(codes::REMOTE_ERROR, "agent reported failure"));
        match error.code.as_str() {
            codes::CONNECTION_ERROR | codes::TIMEOUT => Err(ConductorError::Connectivity {
                agent_id: agent.agent_id,
                message: error.message,
            }),
            _ => Err(ConductorError::RemoteTask {
                agent_id: agent.agent_id,
                message: error.message,
            }),
        }
    }
}
