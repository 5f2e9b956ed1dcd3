//! Domain router
//!
//! Layer 1 of the decision pipeline: maps a free-text request to exactly one
//! domain from the closed set, with a continuity bias toward the previous
//! turn's domain and an ambiguity signal instead of low-confidence guesses.

pub mod classifier;
pub mod router;

pub use classifier::KeywordClassifier;
pub use router::{DomainRouter, Routing};

use thiserror::Error;

/// Router errors
#[derive(Error, Debug)]
pub enum RouterError {
    /// No domain reached the confidence floor; the coordinator decides the
    /// fallback (clarify, or broaden the search)
    #[error("no domain reached the confidence floor")]
    AmbiguousDomain,

    /// Re-routing excluded every configured domain
    #[error("all domains excluded")]
    NoDomainsRemaining,

    #[error("classifier failure: {0}")]
    Classifier(#[from] api_agent_core::Error),
}
