//! Agent registry
//!
//! Holds the known fleet of remote agents, their declared capabilities and
//! last-observed health. The health monitor is the only writer of health
//! fields after registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ConductorError, Result};

/// Observed health of a registered agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentHealth {
    Active,
    Inactive,
    Error,
}

impl std::fmt::Display for AgentHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentHealth::Active => write!(f, "active"),
            AgentHealth::Inactive => write!(f, "inactive"),
            AgentHealth::Error => write!(f, "error"),
        }
    }
}

/// Derived fleet-wide health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Healthy,
    Degraded,
    Critical,
}

impl SystemHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemHealth::Healthy => "healthy",
            SystemHealth::Degraded => "degraded",
            SystemHealth::Critical => "critical",
        }
    }
}

/// Registration payload for an agent deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub agent_id: String,
    pub agent_type: String,
    pub base_url: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Liveness path probed by the monitor; defaults to the agent root
    #[serde(default)]
    pub health_path: Option<String>,
}

/// A registered agent with its last-observed health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub agent_type: String,
    pub base_url: String,
    pub capabilities: Vec<String>,
    pub health_path: Option<String>,
    pub status: AgentHealth,
    /// Time of the most recent probe attempt, success or failure
    pub last_heartbeat: DateTime<Utc>,
    pub error_detail: Option<String>,
}

impl Agent {
    fn from_descriptor(descriptor: AgentDescriptor) -> Self {
        Self {
            agent_id: descriptor.agent_id,
            agent_type: descriptor.agent_type,
            base_url: descriptor.base_url,
            capabilities: descriptor.capabilities,
            health_path: descriptor.health_path,
            status: AgentHealth::Inactive,
            last_heartbeat: Utc::now(),
            error_detail: None,
        }
    }

    fn matches_descriptor(&self, descriptor: &AgentDescriptor) -> bool {
        self.agent_type == descriptor.agent_type
            && self.base_url == descriptor.base_url
            && self.capabilities == descriptor.capabilities
            && self.health_path == descriptor.health_path
    }

    /// URL probed by the health monitor
    pub fn probe_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.health_path.as_deref() {
            Some(path) => format!("{}/{}", base, path.trim_start_matches('/')),
            None => format!("{}/", base),
        }
    }
}

/// External status shape for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatusView {
    pub agent_id: String,
    pub agent_type: String,
    pub status: AgentHealth,
    pub last_heartbeat: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl From<&Agent> for AgentStatusView {
    fn from(agent: &Agent) -> Self {
        Self {
            agent_id: agent.agent_id.clone(),
            agent_type: agent.agent_type.clone(),
            status: agent.status,
            last_heartbeat: agent.last_heartbeat,
            error_details: agent.error_detail.clone(),
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    agents: HashMap<String, Agent>,
    /// Insertion order, for stable listings
    order: Vec<String>,
    /// capability name -> agent_id of the agent declaring it
    capability_index: HashMap<String, String>,
}

/// Shared registry of remote agents
#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent.
    ///
    /// Re-registering an id with an identical descriptor is idempotent and
    /// returns the stored record with its health untouched. A differing
    /// descriptor for an existing id is rejected with `DuplicateAgent`.
    pub async fn register(&self, descriptor: AgentDescriptor) -> Result<Agent> {
        if descriptor.agent_id.trim().is_empty() {
            return Err(ConductorError::Validation(
                "agent_id must not be empty".to_string(),
            ));
        }
        if url::Url::parse(&descriptor.base_url).is_err() {
            return Err(ConductorError::Validation(format!(
                "invalid base_url for agent {}: {}",
                descriptor.agent_id, descriptor.base_url
            )));
        }

        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.agents.get(&descriptor.agent_id) {
            if existing.matches_descriptor(&descriptor) {
                debug!("Idempotent re-registration of agent {}", descriptor.agent_id);
                return Ok(existing.clone());
            }
            return Err(ConductorError::DuplicateAgent(descriptor.agent_id));
        }

        let agent = Agent::from_descriptor(descriptor);
        info!(
            "Registered agent {} ({}) with {} capabilities",
            agent.agent_id,
            agent.agent_type,
            agent.capabilities.len()
        );
        for capability in &agent.capabilities {
            if let Some(previous) = inner
                .capability_index
                .insert(capability.clone(), agent.agent_id.clone())
            {
                warn!(
                    "Capability {} moved from agent {} to {}",
                    capability, previous, agent.agent_id
                );
            }
        }
        inner.order.push(agent.agent_id.clone());
        inner.agents.insert(agent.agent_id.clone(), agent.clone());
        Ok(agent)
    }

    pub async fn get(&self, agent_id: &str) -> Result<Agent> {
        let inner = self.inner.read().await;
        inner
            .agents
            .get(agent_id)
            .cloned()
            .ok_or_else(|| ConductorError::AgentNotFound(agent_id.to_string()))
    }

    /// Snapshot of all agents in registration order
    pub async fn list_all(&self) -> Vec<Agent> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.agents.get(id).cloned())
            .collect()
    }

    /// The agent declaring a capability, if any
    pub async fn agent_for_capability(&self, capability: &str) -> Option<Agent> {
        let inner = self.inner.read().await;
        inner
            .capability_index
            .get(capability)
            .and_then(|id| inner.agents.get(id))
            .cloned()
    }

    /// Record the outcome of a health probe.
    ///
    /// Called only by the health monitor. Unknown ids are ignored rather
    /// than treated as an error: the monitor only polls registered agents,
    /// so a miss here means the snapshot it worked from went stale.
    pub async fn update_health(
        &self,
        agent_id: &str,
        status: AgentHealth,
        error_detail: Option<String>,
    ) {
        let mut inner = self.inner.write().await;
        match inner.agents.get_mut(agent_id) {
            Some(agent) => {
                agent.status = status;
                agent.last_heartbeat = Utc::now();
                agent.error_detail = error_detail;
            }
            None => {
                warn!("Health update for unknown agent {} ignored", agent_id);
            }
        }
    }

    /// Derived fleet health: healthy iff every agent is active, critical
    /// iff none is, degraded otherwise. An empty fleet reports healthy.
    pub async fn system_health(&self) -> SystemHealth {
        let inner = self.inner.read().await;
        derive_system_health(inner.agents.values())
    }
}

fn derive_system_health<'a>(agents: impl Iterator<Item = &'a Agent>) -> SystemHealth {
    let mut total = 0usize;
    let mut active = 0usize;
    for agent in agents {
        total += 1;
        if agent.status == AgentHealth::Active {
            active += 1;
        }
    }
    if active == total {
        SystemHealth::Healthy
    } else if active == 0 {
        SystemHealth::Critical
    } else {
        SystemHealth::Degraded
    }
}
