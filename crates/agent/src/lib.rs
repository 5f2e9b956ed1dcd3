//! Execution agent
//!
//! Layer 3 of the decision pipeline: given the retrieval shortlist it picks
//! the tool (or tools) to call, resolves parameters from the request text and
//! conversation carry-over, invokes them concurrently with bounded retries,
//! and synthesizes a grounded response.

pub mod agent;
pub mod params;
pub mod plan;
pub mod synthesizer;

pub use agent::ExecutionAgent;
pub use params::ParameterResolver;
pub use plan::{PlannedCall, plan_calls};
pub use synthesizer::TemplateSynthesizer;

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Agent errors surfaced to the workflow coordinator
#[derive(Error, Debug)]
pub enum AgentError {
    /// The shortlist was empty; the coordinator re-routes or clarifies
    #[error("no tool candidate for request")]
    NoCandidate,

    /// Required parameters could not be resolved; the coordinator asks the
    /// user instead of guessing. `resolved` carries the values that did
    /// resolve, so a clarification round does not lose them.
    #[error("tool {tool_id} is missing required parameters: {missing:?}")]
    MissingParameters {
        tool_id: String,
        missing: Vec<String>,
        resolved: BTreeMap<String, Value>,
    },

    #[error("synthesis failure: {0}")]
    Synthesis(#[from] api_agent_core::Error),
}
