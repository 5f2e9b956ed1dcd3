//! Domain classification trait

use async_trait::async_trait;

use crate::domain::{DomainScore, DomainSet};
use crate::Result;

/// Scores a request against the closed domain set.
///
/// Implementations may call an LLM or embedding service; the in-repo
/// `KeywordClassifier` is a deterministic offline implementation. A
/// classifier must be a pure function of its inputs and its own immutable
/// state: identical inputs yield identical scores.
#[async_trait]
pub trait DomainClassifier: Send + Sync + 'static {
    /// Score every domain in `domains` for `text`.
    ///
    /// Returns one score per domain, in domain-set order, each confidence in
    /// [0.0, 1.0]. May fail transiently (network) or permanently.
    async fn classify(&self, text: &str, domains: &DomainSet) -> Result<Vec<DomainScore>>;

    /// Implementation name for logging
    fn name(&self) -> &str;
}
