//! Workflow engine
//!
//! Creates workflow instances from the template table and drives their
//! steps to completion. `execute_workflow` returns as soon as the instance
//! is persisted; the step loop runs on its own spawned task so callers
//! never block on remote agents. Steps run strictly in declared order and
//! the first failure stops the workflow (fail-fast, no compensation).

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::a2a::client::TaskDispatch;
use crate::a2a::types::{codes, TaskError};
use crate::error::{ConductorError, Result};
use crate::registry::AgentRegistry;
use crate::workflow::model::Workflow;
use crate::workflow::store::WorkflowStore;
use crate::workflow::templates;

#[derive(Clone)]
pub struct WorkflowEngine {
    registry: AgentRegistry,
    store: Arc<WorkflowStore>,
    client: Arc<dyn TaskDispatch>,
}

impl WorkflowEngine {
    pub fn new(
        registry: AgentRegistry,
        store: Arc<WorkflowStore>,
        client: Arc<dyn TaskDispatch>,
    ) -> Self {
        Self {
            registry,
            store,
            client,
        }
    }

    /// Instantiate a named workflow and begin executing it in the
    /// background. Returns the pending instance snapshot immediately.
    pub async fn execute_workflow(&self, name: &str, parameters: Value) -> Result<Workflow> {
        let template = templates::template(name)
            .ok_or_else(|| ConductorError::UnknownWorkflow(name.to_string()))?;

        let mut workflow = Workflow::new(name, parameters);
        for step in template.steps {
            workflow.add_step(step.step_name, step.agent_id, step.capability);
        }
        let snapshot = workflow.clone();
        self.store.create(workflow).await?;

        info!(
            "Executing workflow {} ({}, {} steps)",
            snapshot.workflow_id,
            name,
            snapshot.steps.len()
        );

        let engine = self.clone();
        let instance = snapshot.clone();
        tokio::spawn(async move {
            engine.run(instance).await;
        });

        Ok(snapshot)
    }

    pub async fn get_workflow_status(&self, workflow_id: &str) -> Result<Workflow> {
        self.store.get(workflow_id).await
    }

    /// Step loop for one workflow instance. Owns all writes to the record;
    /// the store's per-record lock isolates it from readers.
    async fn run(&self, workflow: Workflow) {
        let workflow_id = workflow.workflow_id.clone();
        if self.store.update(&workflow_id, |wf| wf.start()).await.is_err() {
            // Evicted before the first step; nothing to do
            return;
        }

        let mut prior_results: Map<String, Value> = Map::new();

        for (idx, step) in workflow.steps.iter().enumerate() {
            let _ = self
                .store
                .update(&workflow_id, |wf| wf.steps[idx].start())
                .await;

            let agent = match self.registry.get(&step.agent_id).await {
                Ok(agent) => agent,
                Err(_) => {
                    warn!(
                        "Workflow {} step {} targets unknown agent {}",
                        workflow_id, step.step_id, step.agent_id
                    );
                    self.fail_step(
                        &workflow_id,
                        idx,
                        TaskError::new(
                            codes::AGENT_NOT_FOUND,
                            format!("agent {} is not registered", step.agent_id),
                        ),
                    )
                    .await;
                    return;
                }
            };

            let parameters = compose_step_parameters(&workflow.parameters, &prior_results);
            let outcome = self
                .client
                .send_task(&agent, &step.capability, parameters)
                .await;

            if outcome.is_success() {
                prior_results.insert(
                    format!("{}_result", step.capability),
                    outcome.result.clone().unwrap_or(Value::Null),
                );
                let result = outcome.result;
                let _ = self
                    .store
                    .update(&workflow_id, move |wf| {
                        wf.steps[idx].complete(result);
                        wf.refresh_status();
                    })
                    .await;
            } else {
                let error = outcome
                    .error
                    .unwrap_or_else(|| TaskError::new(codes::REMOTE_ERROR, "agent reported failure"));
                warn!(
                    "Workflow {} step {} failed: {} ({})",
                    workflow_id, step.step_id, error.message, error.code
                );
                self.fail_step(&workflow_id, idx, error).await;
                return;
            }
        }

        info!("Workflow {} completed", workflow_id);
    }

    async fn fail_step(&self, workflow_id: &str, idx: usize, error: TaskError) {
        let _ = self
            .store
            .update(workflow_id, move |wf| {
                wf.steps[idx].fail(error);
                wf.refresh_status();
            })
            .await;
    }
}

/// Step parameters are the workflow parameters plus one
/// `<capability>_result` entry per completed prior step.
fn compose_step_parameters(workflow_parameters: &Value, prior_results: &Map<String, Value>) -> Value {
    let mut merged = match workflow_parameters {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("input".to_string(), other.clone());
            map
        }
    };
    for (key, value) in prior_results {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}
