//! End-to-end tests driving the HTTP surface against stub agent services.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use conductor::api::{create_router, AppState};
use conductor::config::{MonitorConfig, TaskClientConfig};
use conductor::mcp::FunctionDispatcher;
use conductor::monitor::HealthMonitor;
use conductor::registry::AgentRegistry;
use conductor::workflow::{WorkflowEngine, WorkflowStore};
use conductor::{HttpTaskClient, TaskDispatch};

struct Harness {
    router: Router,
    registry: AgentRegistry,
    store: Arc<WorkflowStore>,
    monitor: HealthMonitor,
}

fn harness() -> Harness {
    let registry = AgentRegistry::new();
    let client: Arc<dyn TaskDispatch> =
        Arc::new(HttpTaskClient::new(&TaskClientConfig { timeout_secs: 2 }));
    let store = Arc::new(WorkflowStore::new(64));
    let engine = WorkflowEngine::new(registry.clone(), Arc::clone(&store), Arc::clone(&client));
    let dispatcher = Arc::new(FunctionDispatcher::new(
        registry.clone(),
        engine.clone(),
        Arc::clone(&client),
    ));
    let monitor = HealthMonitor::new(
        registry.clone(),
        client,
        &MonitorConfig {
            poll_interval_secs: 30,
            probe_timeout_secs: 1,
        },
    );
    let state = AppState::new(registry.clone(), engine, dispatcher);
    Harness {
        router: create_router(state),
        registry,
        store,
        monitor,
    }
}

/// Spawn a stub agent whose task endpoint fails for the given capability
/// and succeeds for every other one.
async fn spawn_agent_stub(fail_capability: Option<&'static str>) -> String {
    let router = Router::new()
        .route("/", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/api/v1/tasks",
            post(move |Json(task): Json<Value>| async move {
                let capability = task["capability"].as_str().unwrap_or_default().to_string();
                if Some(capability.as_str()) == fail_capability {
                    Json(json!({
                        "task_id": task["task_id"],
                        "status": "failed",
                        "error": {"message": format!("{capability} rejected by agent")},
                    }))
                } else {
                    Json(json!({
                        "task_id": task["task_id"],
                        "status": "completed",
                        "result": {"echo": task["parameters"], "capability": capability},
                    }))
                }
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn register_fleet(harness: &Harness, fail_capability: Option<&'static str>) {
    for (agent_id, agent_type, capability) in [
        ("market_analysis_agent", "MarketAnalysis", "market_analysis"),
        ("trade_execution_agent", "TradeExecution", "execute_trade"),
        (
            "risk_management_agent",
            "RiskManagement",
            "monitor_portfolio_risk",
        ),
        (
            "reporting_analytics_agent",
            "ReportingAnalytics",
            "generate_performance_report",
        ),
    ] {
        let base_url = spawn_agent_stub(fail_capability).await;
        let (status, _) = send(
            &harness.router,
            post_json(
                "/api/v1/mcp/agent/register",
                json!({
                    "agent_id": agent_id,
                    "agent_type": agent_type,
                    "base_url": base_url,
                    "capabilities": [capability],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

async fn poll_workflow_until_terminal(harness: &Harness, workflow_id: &str) -> Value {
    for _ in 0..200 {
        let (status, body) = send(
            &harness.router,
            get_req(&format!("/api/v1/mcp/workflow/{workflow_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let state = body["status"].as_str().unwrap().to_string();
        if state == "completed" || state == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("workflow {workflow_id} never reached a terminal state");
}

#[tokio::test]
async fn health_endpoint_reports_service_identity() {
    let harness = harness();
    let (status, body) = send(&harness.router, get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "conductor");
}

#[tokio::test]
async fn healthy_fleet_rolls_up_after_a_probe_sweep() {
    let harness = harness();
    register_fleet(&harness, None).await;

    // Before any probe nothing is active yet
    let (_, body) = send(&harness.router, get_req("/api/v1/mcp/status/agents")).await;
    assert_eq!(body["system_health"], "critical");

    harness.monitor.poll_once().await;

    let (status, body) = send(&harness.router, get_req("/api/v1/mcp/status/agents")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["system_health"], "healthy");
    let agents = body["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 4);
    assert!(agents.iter().all(|a| a["status"] == "active"));

    let (status, body) = send(
        &harness.router,
        get_req("/api/v1/mcp/status/agent/market_analysis_agent"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_type"], "MarketAnalysis");

    let (status, _) = send(&harness.router, get_req("/api/v1/mcp/status/agent/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn portfolio_rebalance_completes_all_steps_in_order() {
    let harness = harness();
    register_fleet(&harness, None).await;

    let (status, body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/workflow",
            json!({
                "workflow_name": "portfolio_rebalance",
                "parameters": {"risk_level": "moderate"},
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    let workflow_id = body["workflow_id"].as_str().unwrap().to_string();

    let done = poll_workflow_until_terminal(&harness, &workflow_id).await;
    assert_eq!(done["status"], "completed");
    assert!(done["estimated_completion"].is_string());

    let steps = done["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    let agent_order: Vec<&str> = steps.iter().map(|s| s["agent_id"].as_str().unwrap()).collect();
    assert_eq!(
        agent_order,
        vec![
            "risk_management_agent",
            "market_analysis_agent",
            "trade_execution_agent"
        ]
    );
    assert!(steps.iter().all(|s| s["status"] == "completed"));
    // The parameters reached the remote agents
    assert_eq!(steps[0]["result"]["echo"]["risk_level"], "moderate");
}

#[tokio::test]
async fn failing_step_stops_the_workflow() {
    let harness = harness();
    // Second step of portfolio_rebalance targets market_analysis
    register_fleet(&harness, Some("market_analysis")).await;

    let (_, body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/workflow",
            json!({"workflow_name": "portfolio_rebalance"}),
        ),
    )
    .await;
    let workflow_id = body["workflow_id"].as_str().unwrap().to_string();

    let done = poll_workflow_until_terminal(&harness, &workflow_id).await;
    assert_eq!(done["status"], "failed");
    let steps = done["steps"].as_array().unwrap();
    assert_eq!(steps[0]["status"], "completed");
    assert_eq!(steps[1]["status"], "failed");
    assert!(steps[1]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("rejected by agent"));
    assert_eq!(steps[2]["status"], "pending");
    assert!(steps[2]["start_time"].is_null());
}

#[tokio::test]
async fn unknown_workflow_is_a_bad_request() {
    let harness = harness();
    let (status, _) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/workflow",
            json!({"workflow_name": "liquidate_everything"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn function_endpoint_wraps_missing_parameters() {
    let harness = harness();
    let (status, body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/function",
            json!({"function_name": "execute_workflow", "arguments": {}}),
        ),
    )
    .await;
    // The envelope is the error surface, not the HTTP status
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "MissingParameter");
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn function_endpoint_reports_unknown_functions() {
    let harness = harness();
    let (status, body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/function",
            json!({"function_name": "unknown_fn", "arguments": {}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "UnknownFunction");
}

#[tokio::test]
async fn function_endpoint_runs_workflows_end_to_end() {
    let harness = harness();
    register_fleet(&harness, None).await;

    let (_, body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/function",
            json!({
                "function_name": "execute_workflow",
                "arguments": {
                    "workflow_name": "performance_report",
                    "parameters": {"time_period": "30d"},
                },
            }),
        ),
    )
    .await;
    assert_eq!(body["status"], "success");
    let workflow_id = body["result"]["workflow_id"].as_str().unwrap().to_string();

    let done = poll_workflow_until_terminal(&harness, &workflow_id).await;
    assert_eq!(done["status"], "completed");

    // The same record is visible through the function surface
    let (_, status_body) = send(
        &harness.router,
        post_json(
            "/api/v1/mcp/function",
            json!({
                "function_name": "get_workflow_status",
                "arguments": {"workflow_id": workflow_id},
            }),
        ),
    )
    .await;
    assert_eq!(status_body["status"], "success");
    assert_eq!(status_body["result"]["status"], "completed");
}

#[tokio::test]
async fn conflicting_registration_is_a_conflict() {
    let harness = harness();
    let base_url = spawn_agent_stub(None).await;
    let descriptor = json!({
        "agent_id": "market_analysis_agent",
        "agent_type": "MarketAnalysis",
        "base_url": base_url,
        "capabilities": ["market_analysis"],
    });

    let (status, _) = send(
        &harness.router,
        post_json("/api/v1/mcp/agent/register", descriptor.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Identical descriptor: idempotent
    let (status, _) = send(
        &harness.router,
        post_json("/api/v1/mcp/agent/register", descriptor.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same id, different base_url: rejected
    let mut conflicting = descriptor;
    conflicting["base_url"] = json!("http://somewhere-else:9000");
    let (status, _) = send(
        &harness.router,
        post_json("/api/v1/mcp/agent/register", conflicting),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(harness.registry.list_all().await.len(), 1);
}
