//! Keyword-overlap domain classifier
//!
//! Deterministic offline classifier: scores a request against each domain's
//! description and example utterances by word overlap, using Unicode word
//! boundaries. Production deployments swap in an LLM- or embedding-backed
//! `DomainClassifier`; this one also serves as the test double.

use std::collections::HashSet;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use api_agent_core::{DomainClassifier, DomainScore, DomainSet, Result};

/// Word-overlap classifier over domain descriptions and examples
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score_against(text: &str, reference: &str) -> f32 {
        let text_lower = text.to_lowercase();
        let reference_lower = reference.to_lowercase();

        if text_lower == reference_lower {
            return 1.0;
        }
        if text_lower.contains(&reference_lower) {
            return 0.9;
        }

        let reference_words: HashSet<&str> = reference_lower.unicode_words().collect();
        let text_words: HashSet<&str> = text_lower.unicode_words().collect();
        if reference_words.is_empty() {
            return 0.0;
        }

        let overlap = reference_words.intersection(&text_words).count();
        (overlap as f32 / reference_words.len() as f32) * 0.8
    }
}

#[async_trait]
impl DomainClassifier for KeywordClassifier {
    async fn classify(&self, text: &str, domains: &DomainSet) -> Result<Vec<DomainScore>> {
        let scores = domains
            .iter()
            .map(|spec| {
                let mut best = Self::score_against(text, &spec.description);
                for example in &spec.examples {
                    best = best.max(Self::score_against(text, example));
                }
                DomainScore {
                    domain: spec.domain.clone(),
                    confidence: best.clamp(0.0, 1.0),
                }
            })
            .collect();

        Ok(scores)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_agent_core::{Domain, DomainSpec};

    fn domains() -> DomainSet {
        DomainSet::new(vec![
            DomainSpec::new("WEATHER", "Weather forecasts and current conditions")
                .with_example("what's the weather in Paris")
                .with_example("will it rain tomorrow"),
            DomainSpec::new("FINANCE", "Stock prices, payments, and refunds")
                .with_example("refund the payment")
                .with_example("stock price of ACME"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_scores_cover_all_domains() {
        let classifier = KeywordClassifier::new();
        let scores = classifier
            .classify("what's the weather in Paris tomorrow", &domains())
            .await
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].domain, Domain::new("WEATHER"));
    }

    #[tokio::test]
    async fn test_weather_query_prefers_weather() {
        let classifier = KeywordClassifier::new();
        let scores = classifier
            .classify("what's the weather in Paris tomorrow", &domains())
            .await
            .unwrap();

        assert!(scores[0].confidence > scores[1].confidence);
        assert!(scores[0].confidence > 0.5);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let classifier = KeywordClassifier::new();
        let a = classifier.classify("refund the payment", &domains()).await.unwrap();
        let b = classifier.classify("refund the payment", &domains()).await.unwrap();

        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.domain, y.domain);
            assert_eq!(x.confidence, y.confidence);
        }
    }
}
