//! Domain routing decision
//!
//! Wraps a `DomainClassifier` with the routing policy: confidence floor,
//! continuity bias toward the prior turn's domain, and exclusion of domains
//! already tried during re-routing.

use std::sync::Arc;

use api_agent_core::{Domain, DomainClassifier, DomainScore, DomainSet};

use crate::RouterError;

/// A routing decision: the selected domain and the classifier's confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    pub domain: Domain,
    pub confidence: f32,
}

/// Routes a request to exactly one domain from the closed set.
///
/// Selection is deterministic: for equal confidence the earlier domain in the
/// configured set wins. When the previous turn's domain scores within
/// `continuity_margin` of the best candidate, it is preferred over switching.
pub struct DomainRouter {
    classifier: Arc<dyn DomainClassifier>,
    confidence_floor: f32,
    continuity_margin: f32,
}

impl DomainRouter {
    pub fn new(
        classifier: Arc<dyn DomainClassifier>,
        confidence_floor: f32,
        continuity_margin: f32,
    ) -> Self {
        Self {
            classifier,
            confidence_floor,
            continuity_margin,
        }
    }

    /// Classify `text` into one domain.
    ///
    /// `excluded` lists domains already tried this turn; excluding every
    /// configured domain is `NoDomainsRemaining`. A best score below the
    /// confidence floor is `AmbiguousDomain`, never a silent fallback.
    pub async fn route(
        &self,
        text: &str,
        domains: &DomainSet,
        prior_domain: Option<&Domain>,
        excluded: &[Domain],
    ) -> Result<Routing, RouterError> {
        if domains.domains().all(|d| excluded.contains(d)) {
            return Err(RouterError::NoDomainsRemaining);
        }

        let scores = self.classifier.classify(text, domains).await?;
        let eligible: Vec<&DomainScore> = scores
            .iter()
            .filter(|s| domains.contains(&s.domain) && !excluded.contains(&s.domain))
            .collect();

        // Strict comparison keeps the first of equal scores, which is the
        // configured domain order
        let best = eligible
            .iter()
            .copied()
            .fold(None::<&DomainScore>, |best, s| match best {
                Some(b) if s.confidence > b.confidence => Some(s),
                Some(b) => Some(b),
                None => Some(s),
            })
            .ok_or(RouterError::NoDomainsRemaining)?;

        if best.confidence < self.confidence_floor {
            tracing::debug!(
                classifier = self.classifier.name(),
                best = %best.domain,
                confidence = best.confidence,
                floor = self.confidence_floor,
                "routing below confidence floor"
            );
            return Err(RouterError::AmbiguousDomain);
        }

        let selected = match prior_domain {
            Some(prior) if prior != &best.domain => eligible
                .iter()
                .copied()
                .find(|s| {
                    &s.domain == prior
                        && s.confidence >= self.confidence_floor
                        && best.confidence - s.confidence <= self.continuity_margin
                })
                .unwrap_or(best),
            _ => best,
        };

        tracing::info!(
            classifier = self.classifier.name(),
            domain = %selected.domain,
            confidence = selected.confidence,
            continuity = prior_domain.is_some() && Some(&selected.domain) == prior_domain,
            "routed request"
        );

        Ok(Routing {
            domain: selected.domain.clone(),
            confidence: selected.confidence,
        })
    }
}
