//! Health monitor
//!
//! Background loop that probes every registered agent on a fixed interval
//! and writes the observed health back to the registry. The monitor is the
//! sole writer of agent health after registration. A failed probe updates
//! state and the loop keeps going; nothing here is fatal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::a2a::client::TaskDispatch;
use crate::config::MonitorConfig;
use crate::registry::{AgentHealth, AgentRegistry};

#[derive(Clone)]
pub struct HealthMonitor {
    registry: AgentRegistry,
    client: Arc<dyn TaskDispatch>,
    poll_interval: Duration,
    probe_timeout: Duration,
    running: Arc<AtomicBool>,
}

impl HealthMonitor {
    pub fn new(registry: AgentRegistry, client: Arc<dyn TaskDispatch>, config: &MonitorConfig) -> Self {
        Self {
            registry,
            client,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Probe every registered agent once and record the outcomes.
    ///
    /// `last_heartbeat` records the attempt time for failures too, so the
    /// health rollup reflects when the fleet was last inspected.
    pub async fn poll_once(&self) {
        let agents = self.registry.list_all().await;
        if agents.is_empty() {
            debug!("No agents registered, skipping probe sweep");
            return;
        }

        let probes = agents.iter().map(|agent| {
            let client = self.client.clone();
            let timeout = self.probe_timeout;
            async move { (agent.agent_id.clone(), client.probe(agent, timeout).await) }
        });

        for (agent_id, outcome) in futures::future::join_all(probes).await {
            match outcome {
                Ok(()) => {
                    self.registry
                        .update_health(&agent_id, AgentHealth::Active, None)
                        .await;
                }
                Err(reason) => {
                    warn!("Agent {} unhealthy: {}", agent_id, reason);
                    self.registry
                        .update_health(&agent_id, AgentHealth::Error, Some(reason))
                        .await;
                }
            }
        }
    }

    /// Start the background probe loop. Returns once the loop task is
    /// spawned; call `shutdown` to stop it.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(
            "Health monitor started (interval {:?}, probe timeout {:?})",
            self.poll_interval, self.probe_timeout
        );

        let monitor = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            while monitor.running.load(Ordering::SeqCst) {
                interval.tick().await;
                monitor.poll_once().await;
            }
            info!("Health monitor stopped");
        });
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
