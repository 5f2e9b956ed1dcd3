//! Retrieval candidate type
//!
//! Produced fresh by the indexer for each request; never persisted beyond
//! the current turn except as the turn's shortlist snapshot.

use serde::{Deserialize, Serialize};

/// Similarity metric used by the indexer.
///
/// Fixed per indexer instance and documented on it; never mixed across
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    InnerProduct,
}

/// One ranked candidate from semantic retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    /// References a descriptor within the domain selected for this turn
    pub tool_id: String,
    /// Similarity score; cosine similarity lies in [-1.0, 1.0]
    pub score: f32,
    /// Zero-based rank in the shortlist (0 = best)
    pub rank: usize,
}

impl RetrievalCandidate {
    pub fn new(tool_id: impl Into<String>, score: f32, rank: usize) -> Self {
        Self {
            tool_id: tool_id.into(),
            score,
            rank,
        }
    }
}
