//! Deterministic response synthesis
//!
//! Template-based fallback for environments without an LLM. The response is
//! grounded in the invocation records: every result is mentioned, and partial
//! failure names what worked and what did not.

use std::sync::Arc;

use async_trait::async_trait;

use api_agent_catalog::ToolCatalog;
use api_agent_core::{
    ExecutorFailure, InvocationOutcome, ResponseSynthesizer, Result, ToolInvocation,
};

/// User-facing phrasing per failure category
pub fn failure_phrase(failure: &ExecutorFailure) -> String {
    match failure {
        ExecutorFailure::Timeout => "the service took too long to respond".to_string(),
        ExecutorFailure::RateLimited => "the service is receiving too many requests".to_string(),
        ExecutorFailure::Auth(_) => "authentication with the service failed".to_string(),
        ExecutorFailure::Remote { code: 404, .. } => {
            "the requested record was not found".to_string()
        }
        ExecutorFailure::Remote { code, .. } if *code >= 500 => {
            "the service reported an internal problem".to_string()
        }
        ExecutorFailure::Remote { .. } => "the service rejected the request".to_string(),
    }
}

/// Template-based `ResponseSynthesizer`
pub struct TemplateSynthesizer {
    catalog: Arc<ToolCatalog>,
}

impl TemplateSynthesizer {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self { catalog }
    }

    fn tool_name(&self, tool_id: &str) -> String {
        self.catalog
            .get(tool_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| tool_id.to_string())
    }

    fn payload_summary(payload: &serde_json::Value) -> String {
        match payload {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ResponseSynthesizer for TemplateSynthesizer {
    async fn synthesize(&self, _request: &str, invocations: &[ToolInvocation]) -> Result<String> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for invocation in invocations {
            match &invocation.outcome {
                InvocationOutcome::Success { payload } => successes.push(format!(
                    "{}: {}",
                    self.tool_name(&invocation.tool_id),
                    Self::payload_summary(payload)
                )),
                InvocationOutcome::Failure { failure } => failures.push(format!(
                    "{} failed because {}",
                    self.tool_name(&invocation.tool_id),
                    failure_phrase(failure)
                )),
            }
        }

        let response = match (successes.is_empty(), failures.is_empty()) {
            (false, true) => format!("Here is what I found. {}", successes.join(" ")),
            (false, false) => format!(
                "Here is what I could get. {} However, {}.",
                successes.join(" "),
                failures.join("; ")
            ),
            (true, false) => format!(
                "I could not complete that request: {}.",
                failures.join("; ")
            ),
            (true, true) => "I had nothing to run for that request.".to_string(),
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_agent_catalog::HashedEmbedder;
    use api_agent_core::{DomainSet, DomainSpec, ToolDescriptor};
    use serde_json::json;
    use std::collections::BTreeMap;

    async fn synthesizer() -> TemplateSynthesizer {
        let domains = DomainSet::new(vec![DomainSpec::new("WEATHER", "Forecasts")]).unwrap();
        let embedder = Arc::new(HashedEmbedder::default());
        let catalog = ToolCatalog::builder(domains)
            .add_tool(ToolDescriptor::new(
                "get_forecast",
                "Get Forecast",
                "WEATHER",
                "Daily forecast",
            ))
            .add_tool(ToolDescriptor::new(
                "get_air_quality",
                "Get Air Quality",
                "WEATHER",
                "Air quality index",
            ))
            .build(embedder.as_ref())
            .await
            .unwrap();
        TemplateSynthesizer::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_success_mentions_payload() {
        let synthesizer = synthesizer().await;
        let invocations = vec![ToolInvocation::success(
            "get_forecast",
            BTreeMap::new(),
            json!({"temp_c": 21}),
            1,
        )];

        let response = synthesizer.synthesize("weather", &invocations).await.unwrap();
        assert!(response.contains("Get Forecast"));
        assert!(response.contains("21"));
    }

    #[tokio::test]
    async fn test_partial_failure_names_both_sides() {
        let synthesizer = synthesizer().await;
        let invocations = vec![
            ToolInvocation::success("get_forecast", BTreeMap::new(), json!({"temp_c": 21}), 1),
            ToolInvocation::failure(
                "get_air_quality",
                BTreeMap::new(),
                ExecutorFailure::Timeout,
                3,
            ),
        ];

        let response = synthesizer.synthesize("weather", &invocations).await.unwrap();
        assert!(response.contains("Get Forecast"));
        assert!(response.contains("Get Air Quality failed"));
        assert!(response.contains("took too long"));
    }

    #[tokio::test]
    async fn test_total_failure_apologizes() {
        let synthesizer = synthesizer().await;
        let invocations = vec![ToolInvocation::failure(
            "get_forecast",
            BTreeMap::new(),
            ExecutorFailure::Remote { code: 503, message: "unavailable".into() },
            3,
        )];

        let response = synthesizer.synthesize("weather", &invocations).await.unwrap();
        assert!(response.starts_with("I could not complete"));
        assert!(response.contains("internal problem"));
    }
}
