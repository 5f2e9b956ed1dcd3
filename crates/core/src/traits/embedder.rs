//! Text embedding trait

use async_trait::async_trait;

use crate::Result;

/// Produces fixed-length numeric vectors for text.
///
/// Used by the catalog builder (descriptor documents) and the indexer
/// (query embedding). All vectors from one embedder have `dimension()`
/// components.
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output vector length
    fn dimension(&self) -> usize;
}
