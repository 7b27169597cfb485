//! Fixed workflow template table.
//!
//! Templates are the closed set of named multi-step processes the engine
//! can run. Each step names its target agent and the capability to invoke
//! on it; step order is execution order.

/// One stage of a workflow template
#[derive(Debug, Clone, Copy)]
pub struct StepTemplate {
    pub step_name: &'static str,
    pub agent_id: &'static str,
    pub capability: &'static str,
}

/// A named multi-step process definition
#[derive(Debug, Clone, Copy)]
pub struct WorkflowTemplate {
    pub name: &'static str,
    pub steps: &'static [StepTemplate],
}

const MARKET_ANALYSIS_AND_TRADE: WorkflowTemplate = WorkflowTemplate {
    name: "market_analysis_and_trade",
    steps: &[
        StepTemplate {
            step_name: "analyze_market",
            agent_id: "market_analysis_agent",
            capability: "market_analysis",
        },
        StepTemplate {
            step_name: "assess_trade_risk",
            agent_id: "risk_management_agent",
            capability: "assess_trade_risk",
        },
        StepTemplate {
            step_name: "execute_trade",
            agent_id: "trade_execution_agent",
            capability: "execute_trade",
        },
    ],
};

const PORTFOLIO_REBALANCE: WorkflowTemplate = WorkflowTemplate {
    name: "portfolio_rebalance",
    steps: &[
        StepTemplate {
            step_name: "monitor_portfolio_risk",
            agent_id: "risk_management_agent",
            capability: "monitor_portfolio_risk",
        },
        StepTemplate {
            step_name: "analyze_market",
            agent_id: "market_analysis_agent",
            capability: "market_analysis",
        },
        StepTemplate {
            step_name: "execute_rebalance_trades",
            agent_id: "trade_execution_agent",
            capability: "execute_trade",
        },
    ],
};

const RISK_ASSESSMENT: WorkflowTemplate = WorkflowTemplate {
    name: "risk_assessment",
    steps: &[StepTemplate {
        step_name: "monitor_portfolio_risk",
        agent_id: "risk_management_agent",
        capability: "monitor_portfolio_risk",
    }],
};

const PERFORMANCE_REPORT: WorkflowTemplate = WorkflowTemplate {
    name: "performance_report",
    steps: &[StepTemplate {
        step_name: "generate_performance_report",
        agent_id: "reporting_analytics_agent",
        capability: "generate_performance_report",
    }],
};

const TEMPLATES: &[WorkflowTemplate] = &[
    MARKET_ANALYSIS_AND_TRADE,
    PORTFOLIO_REBALANCE,
    RISK_ASSESSMENT,
    PERFORMANCE_REPORT,
];

/// Look up a template by name
pub fn template(name: &str) -> Option<&'static WorkflowTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Names of all known templates
pub fn template_names() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name).collect()
}
