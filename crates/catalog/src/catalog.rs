//! Read-only tool catalog
//!
//! Built once at process start from imported tool definitions, then shared
//! as an `Arc<ToolCatalog>` with every conversation-processing unit. There
//! is no in-place mutation after construction.

use std::collections::HashMap;
use std::fmt;

use api_agent_core::{Domain, DomainSet, Embedder, ToolDescriptor};

use crate::CatalogError;

/// Immutable registry of tool descriptors, partitioned by domain
pub struct ToolCatalog {
    domains: DomainSet,
    /// All descriptors, catalog insertion order
    tools: Vec<ToolDescriptor>,
    by_id: HashMap<String, usize>,
    /// Domain -> descriptor indices, insertion order (the retrieval
    /// tie-break order)
    by_domain: HashMap<Domain, Vec<usize>>,
    /// Embedding dimension shared by every descriptor
    dimension: usize,
}

impl ToolCatalog {
    pub fn builder(domains: DomainSet) -> CatalogBuilder {
        CatalogBuilder {
            domains,
            tools: Vec::new(),
        }
    }

    pub fn get(&self, tool_id: &str) -> Option<&ToolDescriptor> {
        self.by_id.get(tool_id).map(|&i| &self.tools[i])
    }

    /// Descriptors assigned to a domain, in insertion order.
    /// A domain with no tools yields an empty iterator.
    pub fn tools_in_domain(&self, domain: &Domain) -> impl Iterator<Item = &ToolDescriptor> {
        self.by_domain
            .get(domain)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.tools[i])
    }

    pub fn domain_set(&self) -> &DomainSet {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Tool count per domain, in domain-set order
    pub fn stats(&self) -> Vec<(Domain, usize)> {
        self.domains
            .domains()
            .map(|d| {
                let count = self.by_domain.get(d).map(|ids| ids.len()).unwrap_or(0);
                (d.clone(), count)
            })
            .collect()
    }
}

// Embeddings make the derived form unreadable; summarize instead
impl fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.tools.len())
            .field("domains", &self.domains.len())
            .field("dimension", &self.dimension)
            .finish()
    }
}

/// One-shot catalog builder
///
/// Validates the catalog invariants (known domains, unique ids, consistent
/// embedding dimension) and embeds any descriptor that arrived without a
/// precomputed embedding.
pub struct CatalogBuilder {
    domains: DomainSet,
    tools: Vec<ToolDescriptor>,
}

impl CatalogBuilder {
    pub fn add_tool(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn add_tools(mut self, tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub async fn build(self, embedder: &dyn Embedder) -> Result<ToolCatalog, CatalogError> {
        let mut tools = self.tools;
        let mut by_id = HashMap::with_capacity(tools.len());
        let mut by_domain: HashMap<Domain, Vec<usize>> = HashMap::new();
        let dimension = embedder.dimension();

        for (index, tool) in tools.iter_mut().enumerate() {
            if !self.domains.contains(&tool.domain) {
                return Err(CatalogError::UnknownDomain {
                    tool: tool.id.clone(),
                    domain: tool.domain.to_string(),
                });
            }
            if by_id.insert(tool.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateTool(tool.id.clone()));
            }

            if tool.embedding.is_empty() {
                tool.embedding = embedder.embed(&tool.document()).await?;
            }
            if tool.embedding.len() != dimension {
                return Err(CatalogError::DimensionMismatch {
                    tool: tool.id.clone(),
                    expected: dimension,
                    got: tool.embedding.len(),
                });
            }

            by_domain.entry(tool.domain.clone()).or_default().push(index);
        }

        tracing::info!(
            tools = tools.len(),
            domains = self.domains.len(),
            dimension,
            "tool catalog built"
        );

        Ok(ToolCatalog {
            domains: self.domains,
            tools,
            by_id,
            by_domain,
            dimension,
        })
    }
}
