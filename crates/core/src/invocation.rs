//! Tool invocation records and executor failures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Typed failure from the external API executor
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutorFailure {
    #[error("request timed out")]
    Timeout,

    #[error("rate limited by remote service")]
    RateLimited,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("remote error {code}: {message}")]
    Remote { code: u16, message: String },
}

impl ExecutorFailure {
    /// Retryable failures may succeed on a later attempt within the same
    /// turn. 5xx remote errors are treated as transient; 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExecutorFailure::Timeout | ExecutorFailure::RateLimited => true,
            ExecutorFailure::Auth(_) => false,
            ExecutorFailure::Remote { code, .. } => *code >= 500,
        }
    }
}

/// Result of one tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Opaque success payload from the executor
    Success { payload: Value },
    Failure { failure: ExecutorFailure },
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success { .. })
    }
}

/// One invocation of a tool: resolved parameters plus outcome.
///
/// Created by the execution agent, consumed by response synthesis and
/// appended to the conversation's turn record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_id: String,
    /// Resolved parameter values; must satisfy the tool's schema before the
    /// executor is called
    pub parameters: BTreeMap<String, Value>,
    pub outcome: InvocationOutcome,
    /// Executor attempts made (>1 means transient failures were retried)
    pub attempts: u32,
}

impl ToolInvocation {
    pub fn success(
        tool_id: impl Into<String>,
        parameters: BTreeMap<String, Value>,
        payload: Value,
        attempts: u32,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            parameters,
            outcome: InvocationOutcome::Success { payload },
            attempts,
        }
    }

    pub fn failure(
        tool_id: impl Into<String>,
        parameters: BTreeMap<String, Value>,
        failure: ExecutorFailure,
        attempts: u32,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            parameters,
            outcome: InvocationOutcome::Failure { failure },
            attempts,
        }
    }
}
