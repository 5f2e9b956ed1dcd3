//! Semantic tool indexer
//!
//! Ranks one domain's descriptors against a query embedding. The metric is
//! fixed at construction (cosine by default) and never mixed across calls;
//! with L2-normalized embeddings the two metrics coincide.

use std::sync::Arc;

use api_agent_core::{Domain, Embedder, RetrievalCandidate, SimilarityMetric};

use crate::{CatalogError, ToolCatalog};

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot = inner_product(a, b);
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Nearest-neighbor search over the catalog, one domain at a time.
///
/// Pure function of (domain, request text, catalog, top_k): never mutates
/// the catalog, and identical inputs always yield the identical ordered
/// shortlist. Ties are broken by descriptor insertion order.
pub struct ToolIndexer {
    catalog: Arc<ToolCatalog>,
    embedder: Arc<dyn Embedder>,
    metric: SimilarityMetric,
}

impl ToolIndexer {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        embedder: Arc<dyn Embedder>,
        metric: SimilarityMetric,
    ) -> Self {
        Self {
            catalog,
            embedder,
            metric,
        }
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    /// Retrieve at most `top_k` candidates from `domain`, descending score.
    ///
    /// A domain with no tools assigned yields an empty shortlist, not an
    /// error; the coordinator treats empty as "no candidate".
    pub async fn retrieve(
        &self,
        domain: &Domain,
        request_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievalCandidate>, CatalogError> {
        let query = self.embedder.embed(request_text).await?;

        let mut scored: Vec<(f32, &str)> = self
            .catalog
            .tools_in_domain(domain)
            .map(|tool| {
                let score = match self.metric {
                    SimilarityMetric::Cosine => cosine(&query, &tool.embedding),
                    SimilarityMetric::InnerProduct => inner_product(&query, &tool.embedding),
                };
                (score, tool.id.as_str())
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let shortlist: Vec<RetrievalCandidate> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (score, id))| RetrievalCandidate::new(id, score, rank))
            .collect();

        tracing::debug!(
            domain = %domain,
            candidates = shortlist.len(),
            top_score = shortlist.first().map(|c| c.score),
            "tool retrieval"
        );

        Ok(shortlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashedEmbedder;
    use api_agent_core::{DomainSet, DomainSpec, ToolDescriptor};

    async fn fixture() -> ToolIndexer {
        let domains = DomainSet::new(vec![
            DomainSpec::new("WEATHER", "Forecasts"),
            DomainSpec::new("FINANCE", "Payments"),
            DomainSpec::new("TRAVEL", "Flights"),
        ])
        .unwrap();

        let embedder = Arc::new(HashedEmbedder::default());
        let catalog = ToolCatalog::builder(domains)
            .add_tool(ToolDescriptor::new(
                "get_forecast",
                "Get Forecast",
                "WEATHER",
                "Daily weather forecast for a city and date",
            ))
            .add_tool(ToolDescriptor::new(
                "get_current_weather",
                "Get Current Weather",
                "WEATHER",
                "Current weather conditions for a city",
            ))
            .add_tool(ToolDescriptor::new(
                "refund_payment",
                "Refund Payment",
                "FINANCE",
                "Refund a card payment by id",
            ))
            .build(embedder.as_ref())
            .await
            .unwrap();

        ToolIndexer::new(Arc::new(catalog), embedder, SimilarityMetric::Cosine)
    }

    #[tokio::test]
    async fn test_candidates_stay_in_domain() {
        let indexer = fixture().await;
        let shortlist = indexer
            .retrieve(&Domain::new("WEATHER"), "weather forecast for Paris tomorrow", 10)
            .await
            .unwrap();

        assert!(!shortlist.is_empty());
        for candidate in &shortlist {
            let tool = indexer.catalog().get(&candidate.tool_id).unwrap();
            assert_eq!(tool.domain, Domain::new("WEATHER"));
        }
    }

    #[tokio::test]
    async fn test_deterministic_ordering() {
        let indexer = fixture().await;
        let first = indexer
            .retrieve(&Domain::new("WEATHER"), "forecast tomorrow", 10)
            .await
            .unwrap();
        let second = indexer
            .retrieve(&Domain::new("WEATHER"), "forecast tomorrow", 10)
            .await
            .unwrap();

        let ids = |v: &[RetrievalCandidate]| {
            v.iter().map(|c| c.tool_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_forecast_query_ranks_forecast_first() {
        let indexer = fixture().await;
        let shortlist = indexer
            .retrieve(&Domain::new("WEATHER"), "weather forecast for tomorrow", 10)
            .await
            .unwrap();

        assert_eq!(shortlist[0].tool_id, "get_forecast");
        assert_eq!(shortlist[0].rank, 0);
        assert!(shortlist[0].score >= shortlist[1].score);
    }

    #[tokio::test]
    async fn test_empty_domain_yields_empty_shortlist() {
        let indexer = fixture().await;
        let shortlist = indexer
            .retrieve(&Domain::new("TRAVEL"), "book a flight to Rome", 10)
            .await
            .unwrap();
        assert!(shortlist.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_limit() {
        let indexer = fixture().await;
        let shortlist = indexer
            .retrieve(&Domain::new("WEATHER"), "weather", 1)
            .await
            .unwrap();
        assert_eq!(shortlist.len(), 1);
    }
}
