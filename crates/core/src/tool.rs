//! Tool descriptors and parameter schemas
//!
//! A tool is one external API action: name, description, HTTP shape, and an
//! ordered parameter schema. Descriptors are immutable after the catalog is
//! built and carry a precomputed description embedding for retrieval.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Domain;

/// HTTP method of the underlying API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the method carries a request body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter value type, used for extraction and coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Text,
    Number,
    Boolean,
    Date,
    Email,
    Phone,
    City,
}

/// Where the parameter is injected into the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    Header,
}

/// One entry in a tool's parameter schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default = "default_location")]
    pub location: ParamLocation,
}

fn default_location() -> ParamLocation {
    ParamLocation::Query
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: true,
            location: ParamLocation::Query,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            location: ParamLocation::Query,
        }
    }

    pub fn at(mut self, location: ParamLocation) -> Self {
        self.location = location;
        self
    }

    /// Check that a resolved value is coercible to this parameter's type
    pub fn accepts(&self, value: &Value) -> bool {
        match self.param_type {
            ParamType::Number => {
                value.is_number()
                    || value.as_str().map(|s| s.parse::<f64>().is_ok()).unwrap_or(false)
            }
            ParamType::Boolean => {
                value.is_boolean()
                    || value
                        .as_str()
                        .map(|s| matches!(s, "true" | "false" | "yes" | "no"))
                        .unwrap_or(false)
            }
            // Text-like types accept any string
            _ => value.is_string() || value.is_number(),
        }
    }
}

/// A static header attached to every call of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderSpec {
    pub key: String,
    pub value: String,
}

/// Descriptor of one external API tool
///
/// Immutable after catalog build; owned exclusively by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool id (e.g. "get_forecast")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Owning domain; must exist in the configured domain set
    pub domain: Domain,
    /// Natural-language description, the retrieval document
    pub description: String,
    pub method: HttpMethod,
    /// URL template; supports `{var}`, `{{var}}` and `:var` path variables
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HeaderSpec>,
    /// Ordered parameter schema
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// Precomputed description embedding (fixed length across the catalog)
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl ToolDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        domain: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain: Domain::new(domain),
            description: description.into(),
            method: HttpMethod::Get,
            url: String::new(),
            headers: Vec::new(),
            parameters: Vec::new(),
            embedding: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, method: HttpMethod, url: impl Into<String>) -> Self {
        self.method = method;
        self.url = url.into();
        self
    }

    pub fn with_parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderSpec {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Required parameter names, in schema order
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Searchable text representation, embedded at catalog build
    pub fn document(&self) -> String {
        let mut parts = vec![
            format!("Name: {}", self.name),
            format!("Description: {}", self.description),
            format!("Domain: {}", self.domain),
        ];
        if !self.parameters.is_empty() {
            let names: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
            parts.push(format!("Parameters: {}", names.join(", ")));
        }
        parts.join(" | ")
    }
}
