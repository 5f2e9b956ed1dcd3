//! Settings for the routing/retrieval/execution pipeline

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use api_agent_core::{DomainSet, DomainSpec, SimilarityMetric};

use crate::ConfigError;

/// Domain router settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Minimum confidence for a classification to be accepted; below this
    /// for every domain the router signals ambiguity instead of guessing
    pub confidence_floor: f32,
    /// If the top two domains are within this margin, the previous turn's
    /// domain wins (conversation continuity bias)
    pub continuity_margin: f32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            confidence_floor: 0.35,
            continuity_margin: 0.10,
        }
    }
}

/// Tool retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Maximum shortlist size
    pub top_k: usize,
    pub metric: SimilarityMetric,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            metric: SimilarityMetric::Cosine,
        }
    }
}

/// Workflow coordinator bounds and timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Maximum Routing re-entries after empty shortlists, per request
    pub max_reroutes: u32,
    /// Maximum clarification rounds before the turn fails
    pub max_clarification_rounds: u32,
    /// Transient retries allowed after the first attempt of a tool call
    pub executor_retry_budget: u32,
    /// Deadline for a whole turn traversal, in seconds
    pub turn_timeout_secs: u64,
    /// Conversations idle longer than this are garbage-collected, in seconds
    pub session_idle_timeout_secs: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_reroutes: 2,
            max_clarification_rounds: 2,
            executor_retry_budget: 2,
            turn_timeout_secs: 30,
            session_idle_timeout_secs: 3600,
        }
    }
}

impl WorkflowSettings {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }
}

/// HTTP executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: "api-agent/0.1".to_string(),
        }
    }
}

impl ExecutorSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One configured domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSettings {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Complete settings surface consumed by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub router: RouterSettings,
    pub retrieval: RetrievalSettings,
    pub workflow: WorkflowSettings,
    pub executor: ExecutorSettings,
    pub domains: Vec<DomainSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            router: RouterSettings::default(),
            retrieval: RetrievalSettings::default(),
            workflow: WorkflowSettings::default(),
            executor: ExecutorSettings::default(),
            domains: default_domains(),
        }
    }
}

impl Settings {
    /// Build the closed domain set from configuration.
    pub fn domain_set(&self) -> Result<DomainSet, ConfigError> {
        let specs: Vec<DomainSpec> = self
            .domains
            .iter()
            .map(|d| {
                let mut spec = DomainSpec::new(&d.name, &d.description);
                for example in &d.examples {
                    spec = spec.with_example(example);
                }
                spec
            })
            .collect();

        DomainSet::new(specs).map_err(|e| ConfigError::InvalidValue {
            field: "domains".to_string(),
            message: e.to_string(),
        })
    }

    /// Parse settings from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Sanity checks beyond what serde can express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.router.confidence_floor) {
            return Err(ConfigError::InvalidValue {
                field: "router.confidence_floor".to_string(),
                message: "must be within [0.0, 1.0]".to_string(),
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.domains.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "domains".to_string(),
                message: "at least one domain required".to_string(),
            });
        }
        Ok(())
    }
}

/// Default domain enumeration for the payments-platform deployment
pub fn default_domains() -> Vec<DomainSettings> {
    let domain = |name: &str, description: &str, examples: &[&str]| DomainSettings {
        name: name.to_string(),
        description: description.to_string(),
        examples: examples.iter().map(|s| s.to_string()).collect(),
    };

    vec![
        domain(
            "INVOICING",
            "Creating, updating, or managing invoices and billing",
            &["send an invoice", "create a new invoice", "update billing details"],
        ),
        domain(
            "PAYMENTS",
            "Processing payments, refunds, and payment methods",
            &["refund a payment", "charge the customer", "add a payment method"],
        ),
        domain(
            "REPORTING",
            "Generating reports, analytics, and data exports",
            &["export last month's report", "show me analytics", "revenue summary"],
        ),
        domain(
            "DISPUTES",
            "Handling chargebacks, disputes, and claims",
            &["open a dispute", "respond to the chargeback", "claim status"],
        ),
        domain(
            "USER_MANAGEMENT",
            "Managing users, accounts, and permissions",
            &["create a user account", "change permissions", "deactivate the profile"],
        ),
        domain(
            "GENERAL",
            "General queries that don't fit other categories",
            &["what can you do", "help"],
        ),
    ]
}

/// Load settings from an optional file plus `API_AGENT__`-prefixed
/// environment variables (e.g. `API_AGENT__ROUTER__CONFIDENCE_FLOOR=0.5`).
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("API_AGENT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let loaded: Settings = builder.build()?.try_deserialize()?;

    // Sections absent from the sources fall back to their defaults, but an
    // explicitly empty domain list is a configuration mistake.
    let settings = if loaded.domains.is_empty() {
        Settings {
            domains: default_domains(),
            ..loaded
        }
    } else {
        loaded
    };

    settings.validate()?;
    tracing::info!(
        domains = settings.domains.len(),
        top_k = settings.retrieval.top_k,
        "settings loaded"
    );
    Ok(settings)
}
