use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::a2a::types::{TaskError, TaskStatus};

/// Minutes of estimated wall time budgeted per step when a workflow starts
const ESTIMATED_MINUTES_PER_STEP: i64 = 5;

/// Lifecycle state of a workflow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Pending => write!(f, "pending"),
            WorkflowStatus::InProgress => write!(f, "in_progress"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One stage of a workflow. Steps run strictly in declaration order; a step
/// holds the id of its target agent, never the agent record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_id: String,
    pub step_name: String,
    pub agent_id: String,
    pub capability: String,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
}

impl WorkflowStep {
    pub fn start(&mut self) {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::InProgress;
            self.start_time = Some(Utc::now());
        }
    }

    pub fn complete(&mut self, result: Option<Value>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.end_time = Some(Utc::now());
        self.result = result;
    }

    pub fn fail(&mut self, error: TaskError) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.end_time = Some(Utc::now());
        self.error = Some(error);
    }
}

/// An instance of a named, parameterized multi-step process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: String,
    pub workflow_name: String,
    pub parameters: Value,
    pub status: WorkflowStatus,
    pub steps: Vec<WorkflowStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn new(workflow_name: &str, parameters: Value) -> Self {
        let now = Utc::now();
        Self {
            workflow_id: format!("workflow-{}", Uuid::new_v4()),
            workflow_name: workflow_name.to_string(),
            parameters,
            status: WorkflowStatus::Pending,
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
            estimated_completion: None,
        }
    }

    pub fn add_step(&mut self, step_name: &str, agent_id: &str, capability: &str) {
        let step_id = format!("{}-step-{}", self.workflow_id, self.steps.len() + 1);
        self.steps.push(WorkflowStep {
            step_id,
            step_name: step_name.to_string(),
            agent_id: agent_id.to_string(),
            capability: capability.to_string(),
            status: TaskStatus::Pending,
            start_time: None,
            end_time: None,
            result: None,
            error: None,
        });
    }

    /// Mark the workflow as started and budget an estimated completion time
    pub fn start(&mut self) {
        if self.status != WorkflowStatus::Pending {
            return;
        }
        self.status = WorkflowStatus::InProgress;
        self.updated_at = Utc::now();
        self.estimated_completion = Some(
            Utc::now() + Duration::minutes(ESTIMATED_MINUTES_PER_STEP * self.steps.len() as i64),
        );
    }

    /// Re-derive the workflow status from its steps. Terminal states are
    /// never left.
    pub fn refresh_status(&mut self) {
        self.updated_at = Utc::now();
        if self.status.is_terminal() {
            return;
        }

        if self.steps.iter().any(|s| s.status == TaskStatus::Failed) {
            self.status = WorkflowStatus::Failed;
        } else if !self.steps.is_empty()
            && self.steps.iter().all(|s| s.status == TaskStatus::Completed)
        {
            self.status = WorkflowStatus::Completed;
        } else if self.steps.iter().any(|s| s.status != TaskStatus::Pending) {
            self.status = WorkflowStatus::InProgress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::types::codes;
    use serde_json::json;

    fn workflow_with_steps() -> Workflow {
        let mut wf = Workflow::new("portfolio_rebalance", json!({"risk_level": "low"}));
        wf.add_step("monitor_portfolio_risk", "risk_management_agent", "monitor_portfolio_risk");
        wf.add_step("market_analysis", "market_analysis_agent", "market_analysis");
        wf.add_step("execute_trade", "trade_execution_agent", "execute_trade");
        wf
    }

    #[test]
    fn step_ids_are_ordinal() {
        let wf = workflow_with_steps();
        assert_eq!(wf.steps[0].step_id, format!("{}-step-1", wf.workflow_id));
        assert_eq!(wf.steps[2].step_id, format!("{}-step-3", wf.workflow_id));
    }

    #[test]
    fn status_derivation_follows_steps() {
        let mut wf = workflow_with_steps();
        assert_eq!(wf.status, WorkflowStatus::Pending);

        wf.start();
        assert_eq!(wf.status, WorkflowStatus::InProgress);
        assert!(wf.estimated_completion.is_some());

        wf.steps[0].start();
        wf.steps[0].complete(Some(json!({"risk": "low"})));
        wf.refresh_status();
        assert_eq!(wf.status, WorkflowStatus::InProgress);

        for step in wf.steps.iter_mut().skip(1) {
            step.start();
            step.complete(None);
        }
        wf.refresh_status();
        assert_eq!(wf.status, WorkflowStatus::Completed);
    }

    #[test]
    fn failed_step_fails_the_workflow_and_sticks() {
        let mut wf = workflow_with_steps();
        wf.start();
        wf.steps[0].start();
        wf.steps[0].fail(TaskError::new(codes::TIMEOUT, "no response in 30s"));
        wf.refresh_status();
        assert_eq!(wf.status, WorkflowStatus::Failed);

        // Later mutations cannot resurrect a terminal workflow
        wf.steps[1].start();
        wf.steps[1].complete(None);
        wf.refresh_status();
        assert_eq!(wf.status, WorkflowStatus::Failed);
    }

    #[test]
    fn step_terminal_states_are_sticky() {
        let mut wf = workflow_with_steps();
        wf.steps[0].start();
        wf.steps[0].complete(Some(json!(1)));
        wf.steps[0].fail(TaskError::new(codes::REMOTE_ERROR, "late"));
        assert_eq!(wf.steps[0].status, TaskStatus::Completed);
        assert!(wf.steps[0].error.is_none());
    }
}
