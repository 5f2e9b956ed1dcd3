//! Execution agent

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use api_agent_catalog::ToolCatalog;
use api_agent_core::{
    ApiExecutor, RetrievalCandidate, ToolDescriptor, ToolInvocation,
};

use crate::params::ParameterResolver;
use crate::plan::plan_calls;
use crate::AgentError;

/// Drives selection, parameter resolution and invocation for one turn.
///
/// Invocation failures are recorded in the returned `ToolInvocation`s, not
/// raised: partial failure is an answer, and the synthesizer reports it.
/// Only unresolvable inputs (no candidate, missing required parameters)
/// surface as errors, because they need the user rather than the network.
pub struct ExecutionAgent {
    catalog: Arc<ToolCatalog>,
    executor: Arc<dyn ApiExecutor>,
    resolver: ParameterResolver,
    /// Transient retries allowed after the first attempt of each call
    retry_budget: u32,
}

impl ExecutionAgent {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        executor: Arc<dyn ApiExecutor>,
        resolver: ParameterResolver,
        retry_budget: u32,
    ) -> Self {
        Self {
            catalog,
            executor,
            resolver,
            retry_budget,
        }
    }

    /// Run the shortlist against the request.
    ///
    /// Parameter resolution happens for every planned call before any call is
    /// made, so a missing parameter never leaves half the calls executed.
    /// Planned calls then run concurrently.
    pub async fn run(
        &self,
        message: &str,
        shortlist: &[RetrievalCandidate],
        carried: &BTreeMap<String, Value>,
        remembered: &BTreeMap<String, Value>,
    ) -> Result<Vec<ToolInvocation>, AgentError> {
        let calls = plan_calls(message, shortlist, &self.catalog);
        if calls.is_empty() {
            return Err(AgentError::NoCandidate);
        }

        let mut prepared: Vec<(&ToolDescriptor, BTreeMap<String, Value>)> = Vec::new();
        for call in &calls {
            let Some(tool) = self.catalog.get(&call.tool_id) else {
                continue;
            };
            let resolution = self.resolver.resolve(tool, &call.segment, carried, remembered);
            if !resolution.is_complete() {
                return Err(AgentError::MissingParameters {
                    tool_id: tool.id.clone(),
                    missing: resolution.missing,
                    resolved: resolution.values,
                });
            }
            prepared.push((tool, resolution.values));
        }
        if prepared.is_empty() {
            return Err(AgentError::NoCandidate);
        }

        tracing::info!(calls = prepared.len(), "executing planned tool calls");

        let invocations = join_all(
            prepared
                .into_iter()
                .map(|(tool, parameters)| self.invoke_with_retry(tool, parameters)),
        )
        .await;

        Ok(invocations)
    }

    async fn invoke_with_retry(
        &self,
        tool: &ToolDescriptor,
        parameters: BTreeMap<String, Value>,
    ) -> ToolInvocation {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.executor.execute(tool, &parameters).await {
                Ok(payload) => {
                    return ToolInvocation::success(&tool.id, parameters, payload, attempts)
                }
                Err(failure) if failure.is_retryable() && attempts <= self.retry_budget => {
                    tracing::warn!(
                        tool = %tool.id,
                        attempt = attempts,
                        %failure,
                        "transient failure, retrying"
                    );
                }
                Err(failure) => {
                    return ToolInvocation::failure(&tool.id, parameters, failure, attempts)
                }
            }
        }
    }
}
