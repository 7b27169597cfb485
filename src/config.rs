use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::registry::AgentDescriptor;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub task_client: TaskClientConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Agents registered at startup (remote deployments may also register
    /// themselves through the API)
    #[serde(default)]
    pub agents: Vec<AgentDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            monitor: MonitorConfig::default(),
            task_client: TaskClientConfig::default(),
            workflow: WorkflowConfig::default(),
            logging: LoggingConfig::default(),
            agents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind the API server to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind the API server to
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8005
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between health-probe sweeps
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Per-probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskClientConfig {
    /// Timeout for a synchronous task round-trip in seconds
    #[serde(default = "default_task_timeout")]
    pub timeout_secs: u64,
}

fn default_task_timeout() -> u64 {
    30
}

impl Default for TaskClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_task_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum workflows retained in the store; oldest terminal records are
    /// evicted first, running workflows are never evicted
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

fn default_max_retained() -> usize {
    1024
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retained: default_max_retained(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CONDUCTOR_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CONDUCTOR_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("CONDUCTOR")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_suggested_intervals() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.monitor.poll_interval_secs, 30);
        assert_eq!(cfg.monitor.probe_timeout_secs, 5);
        assert_eq!(cfg.task_client.timeout_secs, 30);
        assert_eq!(cfg.workflow.max_retained, 1024);
        assert!(cfg.agents.is_empty());
    }

    #[test]
    fn load_from_missing_dir_yields_defaults() {
        let cfg = AppConfig::load_from("definitely/not/here").expect("defaults");
        assert_eq!(cfg.server.port, 8005);
        assert_eq!(cfg.logging.level, "info");
    }
}
