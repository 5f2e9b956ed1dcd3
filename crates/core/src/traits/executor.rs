//! API executor trait

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::invocation::ExecutorFailure;
use crate::tool::ToolDescriptor;

/// Performs the actual network call for a tool.
///
/// Callers guarantee `parameters` satisfies the descriptor's schema (all
/// required names present, values coercible) before invoking. The payload is
/// opaque to the pipeline; failures are typed so the coordinator can
/// distinguish retryable conditions from permanent ones.
#[async_trait]
pub trait ApiExecutor: Send + Sync + 'static {
    async fn execute(
        &self,
        tool: &ToolDescriptor,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<Value, ExecutorFailure>;
}
