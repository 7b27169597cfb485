use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use conductor::api::{create_router, AppState};
use conductor::config::AppConfig;
use conductor::error::Result;
use conductor::mcp::FunctionDispatcher;
use conductor::monitor::HealthMonitor;
use conductor::registry::AgentRegistry;
use conductor::workflow::{WorkflowEngine, WorkflowStore};
use conductor::{HttpTaskClient, TaskDispatch};

#[derive(Parser, Debug)]
#[command(name = "conductor", about = "Multi-agent crypto portfolio orchestration service")]
struct Cli {
    /// Host to bind the API server to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the API server to (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Configuration directory
    #[arg(long, default_value = "config")]
    config: String,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level), config.logging.json);

    let registry = AgentRegistry::new();
    for descriptor in &config.agents {
        match registry.register(descriptor.clone()).await {
            Ok(agent) => info!("Seeded agent {} from config", agent.agent_id),
            Err(e) => warn!("Skipping seed agent: {}", e),
        }
    }

    let client: Arc<dyn TaskDispatch> = Arc::new(HttpTaskClient::new(&config.task_client));

    let monitor = Arc::new(HealthMonitor::new(
        registry.clone(),
        Arc::clone(&client),
        &config.monitor,
    ));
    monitor.start();

    let store = Arc::new(WorkflowStore::new(config.workflow.max_retained));
    let engine = WorkflowEngine::new(registry.clone(), store, Arc::clone(&client));
    let dispatcher = Arc::new(FunctionDispatcher::new(
        registry.clone(),
        engine.clone(),
        client,
    ));

    let state = AppState::new(registry, engine, dispatcher);
    let router = create_router(state);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Conductor listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor.shutdown();
    info!("Shutdown complete");
    Ok(())
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},conductor={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
