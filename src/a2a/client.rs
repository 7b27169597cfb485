//! HTTP task client
//!
//! Hands one task to one remote agent's task endpoint and normalizes the
//! response. Transport failures come back as `TaskOutcome` data with a
//! machine-readable code; nothing here raises past the caller. No retries
//! at this layer; retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::a2a::types::{codes, Task, TaskOutcome, TaskPriority, TaskResponse, TaskStatus};
use crate::config::TaskClientConfig;
use crate::registry::Agent;

/// Outcome of a liveness probe; the error string is the reason recorded in
/// the agent's `error_detail`.
pub type ProbeResult = std::result::Result<(), String>;

/// Seam between the orchestration core and the wire.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskDispatch: Send + Sync {
    /// Send one task to an agent and block until its synchronous response
    /// or the configured timeout.
    async fn send_task(&self, agent: &Agent, capability: &str, parameters: Value) -> TaskOutcome;

    /// Lightweight liveness probe against the agent's health URL.
    async fn probe(&self, agent: &Agent, timeout: Duration) -> ProbeResult;
}

/// reqwest-backed task client
#[derive(Clone)]
pub struct HttpTaskClient {
    client: Client,
    timeout: Duration,
}

impl HttpTaskClient {
    pub fn new(config: &TaskClientConfig) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn task_url(agent: &Agent) -> String {
        format!("{}/api/v1/tasks", agent.base_url.trim_end_matches('/'))
    }

    fn classify(err: &reqwest::Error) -> &'static str {
        if err.is_timeout() {
            codes::TIMEOUT
        } else {
            codes::CONNECTION_ERROR
        }
    }
}

#[async_trait]
impl TaskDispatch for HttpTaskClient {
    async fn send_task(&self, agent: &Agent, capability: &str, parameters: Value) -> TaskOutcome {
        let task = Task::new(capability, parameters, TaskPriority::default());
        let task_id = task.task_id.clone();
        let url = Self::task_url(agent);

        debug!(
            "Dispatching task {} ({}) to agent {}",
            task_id, capability, agent.agent_id
        );

        let response = match self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&task)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Task {} to {} failed in transit: {}", task_id, agent.agent_id, e);
                return TaskOutcome::failed(task_id, Self::classify(&e), e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return TaskOutcome::failed(
                task_id,
                codes::REMOTE_ERROR,
                format!("agent returned HTTP {}: {}", status, body),
            );
        }

        let body: TaskResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return TaskOutcome::failed(
                    task_id,
                    codes::REMOTE_ERROR,
                    format!("malformed task response: {}", e),
                );
            }
        };

        let task_id = body.task_id.unwrap_or(task_id);
        match body.status {
            TaskStatus::Failed | TaskStatus::Canceled => {
                let message = body
                    .error
                    .as_ref()
                    .map(render_remote_error)
                    .unwrap_or_else(|| "agent reported failure".to_string());
                TaskOutcome::failed(task_id, codes::REMOTE_ERROR, message)
            }
            _ => TaskOutcome::completed(task_id, body.result),
        }
    }

    async fn probe(&self, agent: &Agent, timeout: Duration) -> ProbeResult {
        let url = agent.probe_url();
        match self.client.get(&url).timeout(timeout).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("probe returned HTTP {}", resp.status())),
            Err(e) if e.is_timeout() => Err(format!("probe timed out after {:?}", timeout)),
            Err(e) => Err(format!("probe failed: {}", e)),
        }
    }
}

/// Render an agent-reported error value as a single message string. Agents
/// send either a bare string or an object with a `message` field.
fn render_remote_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
