//! Tool catalog and semantic tool indexer
//!
//! The catalog is the read-only registry of tool descriptors, built once at
//! startup and shared by reference with every conversation-processing unit.
//! The indexer performs nearest-neighbor search over one domain's
//! descriptors to shortlist candidate tools.

pub mod catalog;
pub mod embeddings;
pub mod indexer;

pub use catalog::{CatalogBuilder, ToolCatalog};
pub use embeddings::HashedEmbedder;
pub use indexer::ToolIndexer;

use thiserror::Error;

/// Catalog and retrieval errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("tool {tool}: domain {domain} is not in the configured domain set")]
    UnknownDomain { tool: String, domain: String },

    #[error("duplicate tool id: {0}")]
    DuplicateTool(String),

    #[error("tool {tool}: embedding has {got} dimensions, catalog uses {expected}")]
    DimensionMismatch {
        tool: String,
        expected: usize,
        got: usize,
    },

    #[error("embedding failed: {0}")]
    Embedding(#[from] api_agent_core::Error),
}
