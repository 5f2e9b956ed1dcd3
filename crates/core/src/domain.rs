//! Domain enumeration
//!
//! Domains are a small closed set of coarse topical categories used to
//! partition the tool catalog. The set is configuration: loaded once at
//! startup, read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A domain label (normalized to uppercase, e.g. "INVOICING")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Domain {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Specification of a single domain: label, human description, and example
/// utterances used by keyword-based classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    pub domain: Domain,
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl DomainSpec {
    pub fn new(domain: impl AsRef<str>, description: impl Into<String>) -> Self {
        Self {
            domain: Domain::new(domain),
            description: description.into(),
            examples: Vec::new(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}

/// The closed, ordered set of domains.
///
/// Order matters: it is the deterministic tie-break order for classification
/// and the iteration order for re-routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSet {
    specs: Vec<DomainSpec>,
}

impl DomainSet {
    /// Build a domain set. Fails on an empty list or duplicate labels.
    pub fn new(specs: Vec<DomainSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::Invalid("domain set must not be empty".into()));
        }
        for (i, spec) in specs.iter().enumerate() {
            if specs[..i].iter().any(|s| s.domain == spec.domain) {
                return Err(Error::Invalid(format!(
                    "duplicate domain: {}",
                    spec.domain
                )));
            }
        }
        Ok(Self { specs })
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.specs.iter().any(|s| &s.domain == domain)
    }

    pub fn get(&self, domain: &Domain) -> Option<&DomainSpec> {
        self.specs.iter().find(|s| &s.domain == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainSpec> {
        self.specs.iter()
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.specs.iter().map(|s| &s.domain)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Classifier output for one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: Domain,
    /// Confidence in [0.0, 1.0]
    pub confidence: f32,
}

impl DomainScore {
    pub fn new(domain: impl AsRef<str>, confidence: f32) -> Self {
        Self {
            domain: Domain::new(domain),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_normalization() {
        assert_eq!(Domain::new(" weather ").as_str(), "WEATHER");
        assert_eq!(Domain::new("Weather"), Domain::new("WEATHER"));
    }

    #[test]
    fn test_domain_set_rejects_duplicates() {
        let specs = vec![
            DomainSpec::new("WEATHER", "Forecasts"),
            DomainSpec::new("weather", "Also forecasts"),
        ];
        assert!(DomainSet::new(specs).is_err());
    }

    #[test]
    fn test_domain_set_lookup() {
        let set = DomainSet::new(vec![
            DomainSpec::new("WEATHER", "Forecasts and current conditions"),
            DomainSpec::new("FINANCE", "Stocks and payments"),
        ])
        .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains(&Domain::new("weather")));
        assert!(!set.contains(&Domain::new("TRAVEL")));
    }

    #[test]
    fn test_empty_domain_set_rejected() {
        assert!(DomainSet::new(vec![]).is_err());
    }
}
