//! Workflow coordinator
//!
//! Sequences the decision pipeline for each turn: Routing, Retrieving,
//! Executing, Responding, with Clarifying and Failed branches. Owns the
//! per-conversation state and the session store; every state transition is
//! emitted as a structured event.

pub mod coordinator;
pub mod messages;
pub mod session;
pub mod sink;

pub use coordinator::{TurnPhase, TurnReply, WorkflowCoordinator};
pub use session::SessionManager;
pub use sink::TracingSink;

use std::time::Duration;

use thiserror::Error;

/// Internal workflow errors. These never reach the user directly; the
/// coordinator renders a templated message and ends the turn as `Failed`.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("routing: {0}")]
    Routing(#[from] api_agent_router::RouterError),

    #[error("retrieval: {0}")]
    Retrieval(#[from] api_agent_catalog::CatalogError),

    #[error("agent: {0}")]
    Agent(#[from] api_agent_agent::AgentError),

    #[error("synthesis: {0}")]
    Synthesis(#[from] api_agent_core::Error),

    #[error("turn exceeded {0:?}")]
    TimeoutExceeded(Duration),
}
