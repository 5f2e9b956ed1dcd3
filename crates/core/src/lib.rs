//! Core types and traits for the API agent
//!
//! This crate provides foundational types used across all other crates:
//! - Tool descriptors and parameter schemas
//! - The closed domain enumeration
//! - Retrieval and invocation records
//! - Per-conversation state
//! - Collaborator traits (classifier, embedder, executor, synthesizer, sink)
//! - Error types

pub mod error;
pub mod domain;
pub mod tool;
pub mod retrieval;
pub mod invocation;
pub mod conversation;
pub mod traits;

pub use error::{Error, Result};
pub use domain::{Domain, DomainScore, DomainSet, DomainSpec};
pub use tool::{
    HeaderSpec, HttpMethod, ParamLocation, ParamType, ParameterSpec, ToolDescriptor,
};
pub use retrieval::{RetrievalCandidate, SimilarityMetric};
pub use invocation::{ExecutorFailure, InvocationOutcome, ToolInvocation};
pub use conversation::{
    ClarifyReason, ConversationState, PendingClarification, TurnOutcome, TurnRecord,
};
pub use traits::{
    ApiExecutor, DomainClassifier, Embedder, EventSink, NullSink, ResponseSynthesizer,
    TransitionEvent,
};
