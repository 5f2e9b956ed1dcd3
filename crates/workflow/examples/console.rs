//! Console demo: routes stdin lines through the full pipeline.
//!
//! Uses the default domain set with a small sample catalog. Tool calls go
//! over real HTTP against placeholder endpoints, so invocations will fail
//! unless those are reachable; routing, retrieval, clarification and the
//! failure templates are all exercised offline.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;
use tracing_subscriber::EnvFilter;

use api_agent_agent::{ExecutionAgent, ParameterResolver, TemplateSynthesizer};
use api_agent_catalog::{HashedEmbedder, ToolCatalog, ToolIndexer};
use api_agent_config::load_settings;
use api_agent_core::{HttpMethod, ParamLocation, ParamType, ParameterSpec, ToolDescriptor};
use api_agent_executor::{HttpExecutor, HttpExecutorConfig};
use api_agent_router::{DomainRouter, KeywordClassifier};
use api_agent_workflow::{TracingSink, WorkflowCoordinator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings(None)?;
    let domains = settings.domain_set()?;

    let embedder = Arc::new(HashedEmbedder::default());
    let catalog = Arc::new(
        ToolCatalog::builder(domains.clone())
            .add_tool(
                ToolDescriptor::new(
                    "get_invoice",
                    "Get Invoice",
                    "INVOICING",
                    "Fetch one invoice by its id",
                )
                .with_endpoint(HttpMethod::Get, "https://api.example.com/invoices/{invoice_id}")
                .with_parameter(
                    ParameterSpec::required("invoice_id", ParamType::Text).at(ParamLocation::Path),
                ),
            )
            .add_tool(
                ToolDescriptor::new(
                    "refund_payment",
                    "Refund Payment",
                    "PAYMENTS",
                    "Refund a card payment by amount",
                )
                .with_endpoint(HttpMethod::Post, "https://api.example.com/refunds")
                .with_parameter(
                    ParameterSpec::required("amount", ParamType::Number).at(ParamLocation::Body),
                ),
            )
            .add_tool(
                ToolDescriptor::new(
                    "generate_report",
                    "Generate Report",
                    "REPORTING",
                    "Generate a transactions report for a date",
                )
                .with_endpoint(HttpMethod::Post, "https://api.example.com/reports")
                .with_parameter(
                    ParameterSpec::required("date", ParamType::Date).at(ParamLocation::Body),
                ),
            )
            .build(embedder.as_ref())
            .await?,
    );

    let router = DomainRouter::new(
        Arc::new(KeywordClassifier::new()),
        settings.router.confidence_floor,
        settings.router.continuity_margin,
    );
    let indexer = ToolIndexer::new(catalog.clone(), embedder, settings.retrieval.metric);
    let executor = Arc::new(HttpExecutor::new(
        HttpExecutorConfig::default().with_timeout(settings.executor.request_timeout()),
    )?);
    let resolver = ParameterResolver::new()
        .with_pattern("invoice_id", Regex::new(r"(?i)\b(inv[_-][a-z0-9]+)\b")?);
    let agent = ExecutionAgent::new(
        catalog.clone(),
        executor,
        resolver,
        settings.workflow.executor_retry_budget,
    );
    let synthesizer = Arc::new(TemplateSynthesizer::new(catalog));

    let coordinator = WorkflowCoordinator::new(domains, router, indexer, agent, synthesizer)
        .with_settings(settings.workflow.clone())
        .with_top_k(settings.retrieval.top_k)
        .with_sink(Arc::new(TracingSink));

    let stdin = io::stdin();
    let mut conversation_id: Option<String> = None;
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            print!("> ");
            io::stdout().flush()?;
            continue;
        }
        let reply = coordinator
            .process_message(conversation_id.as_deref(), line.trim())
            .await;
        conversation_id = Some(reply.conversation_id.clone());
        println!("{}", reply.response);
        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}
