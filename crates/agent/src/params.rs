//! Parameter resolution
//!
//! Resolves a tool's parameter schema against the request text, values
//! carried over from earlier clarification rounds, and values remembered
//! from prior turns in the conversation. Extraction is regex-based
//! per parameter type, with optional per-name patterns for domain-specific
//! identifiers. Resolution never guesses: a required parameter with no match
//! is reported missing, which the coordinator turns into a clarifying
//! question.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use api_agent_core::{ParamType, ToolDescriptor};

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").unwrap());
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(today|tomorrow|yesterday|\d{4}-\d{2}-\d{2})\b").unwrap()
});
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").unwrap());
static BOOLEAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(true|false|yes|no)\b").unwrap());
static CITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(paris|london|tokyo|mumbai|delhi|berlin|madrid|rome|sydney|singapore|dubai|new york|san francisco|bengaluru|chennai)\b",
    )
    .unwrap()
});

/// Outcome of resolving one tool's schema
#[derive(Debug, Clone)]
pub struct Resolution {
    pub values: BTreeMap<String, Value>,
    /// Required parameter names with no resolved value, in schema order
    pub missing: Vec<String>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Regex-based parameter extractor
#[derive(Debug, Default)]
pub struct ParameterResolver {
    /// Per-name patterns tried before the type-based ones; first capture
    /// group (or whole match) becomes the value
    named_patterns: HashMap<String, Regex>,
}

impl ParameterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extraction pattern for a specific parameter name,
    /// e.g. `invoice_id` -> `(?i)\binv[_-][a-z0-9]+\b`.
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: Regex) -> Self {
        self.named_patterns.insert(name.into(), pattern);
        self
    }

    fn extract(&self, name: &str, param_type: ParamType, text: &str) -> Option<Value> {
        if let Some(pattern) = self.named_patterns.get(name) {
            if let Some(caps) = pattern.captures(text) {
                let m = caps.get(1).or_else(|| caps.get(0))?;
                return Some(json!(m.as_str()));
            }
        }

        match param_type {
            ParamType::Number => NUMBER
                .find(text)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .map(|n| json!(n)),
            ParamType::Date => DATE.find(text).map(|m| json!(m.as_str().to_lowercase())),
            ParamType::Email => EMAIL.find(text).map(|m| json!(m.as_str())),
            ParamType::Phone => PHONE.find(text).map(|m| json!(m.as_str().trim())),
            ParamType::Boolean => BOOLEAN.find(text).map(|m| {
                json!(matches!(
                    m.as_str().to_lowercase().as_str(),
                    "true" | "yes"
                ))
            }),
            ParamType::City => CITY.find(text).map(|m| json!(capitalize(m.as_str()))),
            // Free text has no reliable standalone pattern
            ParamType::Text => None,
        }
    }

    /// Resolve `tool`'s schema from `text`.
    ///
    /// Carried values from earlier clarification rounds win over fresh
    /// extraction; values remembered from prior turns are a last resort for
    /// follow-ups that leave a parameter unsaid.
    pub fn resolve(
        &self,
        tool: &ToolDescriptor,
        text: &str,
        carried: &BTreeMap<String, Value>,
        remembered: &BTreeMap<String, Value>,
    ) -> Resolution {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for spec in &tool.parameters {
            let candidate = carried
                .get(&spec.name)
                .cloned()
                .or_else(|| self.extract(&spec.name, spec.param_type, text))
                .or_else(|| remembered.get(&spec.name).cloned());

            match candidate {
                Some(value) if spec.accepts(&value) => {
                    values.insert(spec.name.clone(), value);
                }
                _ if spec.required => missing.push(spec.name.clone()),
                _ => {}
            }
        }

        if !missing.is_empty() {
            tracing::debug!(tool = %tool.id, missing = ?missing, "unresolved required parameters");
        }

        Resolution { values, missing }
    }
}

fn capitalize(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_agent_core::{HttpMethod, ParameterSpec};

    fn forecast_tool() -> ToolDescriptor {
        ToolDescriptor::new("get_forecast", "Get Forecast", "WEATHER", "Daily forecast")
            .with_endpoint(HttpMethod::Get, "https://api.example.com/forecast")
            .with_parameter(ParameterSpec::required("city", ParamType::City))
            .with_parameter(ParameterSpec::required("date", ParamType::Date))
            .with_parameter(ParameterSpec::optional("units", ParamType::Text))
    }

    #[test]
    fn test_extracts_city_and_date() {
        let resolver = ParameterResolver::new();
        let resolution = resolver.resolve(
            &forecast_tool(),
            "what's the weather in Paris tomorrow",
            &BTreeMap::new(),
            &BTreeMap::new(),
        );

        assert!(resolution.is_complete());
        assert_eq!(resolution.values["city"], json!("Paris"));
        assert_eq!(resolution.values["date"], json!("tomorrow"));
    }

    #[test]
    fn test_iso_date() {
        let resolver = ParameterResolver::new();
        let resolution = resolver.resolve(
            &forecast_tool(),
            "forecast for London on 2026-09-01",
            &BTreeMap::new(),
            &BTreeMap::new(),
        );
        assert_eq!(resolution.values["date"], json!("2026-09-01"));
    }

    #[test]
    fn test_missing_required_reported_in_schema_order() {
        let resolver = ParameterResolver::new();
        let resolution =
            resolver.resolve(&forecast_tool(), "what's the weather", &BTreeMap::new(), &BTreeMap::new());

        assert!(!resolution.is_complete());
        assert_eq!(resolution.missing, vec!["city".to_string(), "date".to_string()]);
    }

    #[test]
    fn test_carried_parameters_win() {
        let resolver = ParameterResolver::new();
        let carried: BTreeMap<String, Value> =
            [("city".to_string(), json!("Tokyo"))].into_iter().collect();

        let resolution =
            resolver.resolve(&forecast_tool(), "tomorrow in London", &carried, &BTreeMap::new());
        assert_eq!(resolution.values["city"], json!("Tokyo"));
    }

    #[test]
    fn test_remembered_values_fill_gaps() {
        let resolver = ParameterResolver::new();
        let remembered: BTreeMap<String, Value> =
            [("city".to_string(), json!("Paris"))].into_iter().collect();

        let resolution =
            resolver.resolve(&forecast_tool(), "and tomorrow?", &BTreeMap::new(), &remembered);
        assert!(resolution.is_complete());
        assert_eq!(resolution.values["city"], json!("Paris"));
        assert_eq!(resolution.values["date"], json!("tomorrow"));
    }

    #[test]
    fn test_fresh_extraction_beats_remembered() {
        let resolver = ParameterResolver::new();
        let remembered: BTreeMap<String, Value> =
            [("city".to_string(), json!("Paris"))].into_iter().collect();

        let resolution =
            resolver.resolve(&forecast_tool(), "what about London today", &BTreeMap::new(), &remembered);
        assert_eq!(resolution.values["city"], json!("London"));
    }

    #[test]
    fn test_named_pattern() {
        let tool = ToolDescriptor::new("get_invoice", "Get Invoice", "INVOICING", "Fetch invoice")
            .with_endpoint(HttpMethod::Get, "https://api.example.com/invoices/{invoice_id}")
            .with_parameter(ParameterSpec::required("invoice_id", ParamType::Text));

        let resolver = ParameterResolver::new()
            .with_pattern("invoice_id", Regex::new(r"(?i)\b(inv[_-][a-z0-9]+)\b").unwrap());

        let resolution =
            resolver.resolve(&tool, "show me invoice INV_2041", &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(resolution.values["invoice_id"], json!("INV_2041"));
    }

    #[test]
    fn test_email_and_boolean() {
        let tool = ToolDescriptor::new("invite_user", "Invite User", "USER_MANAGEMENT", "Invite")
            .with_endpoint(HttpMethod::Post, "https://api.example.com/users")
            .with_parameter(ParameterSpec::required("email", ParamType::Email))
            .with_parameter(ParameterSpec::optional("admin", ParamType::Boolean));

        let resolver = ParameterResolver::new();
        let resolution = resolver.resolve(
            &tool,
            "invite jane.doe@example.com yes make them admin",
            &BTreeMap::new(),
            &BTreeMap::new(),
        );

        assert_eq!(resolution.values["email"], json!("jane.doe@example.com"));
        assert_eq!(resolution.values["admin"], json!(true));
    }

    #[test]
    fn test_number_extraction() {
        let tool = ToolDescriptor::new("refund", "Refund", "PAYMENTS", "Refund a payment")
            .with_endpoint(HttpMethod::Post, "https://api.example.com/refunds")
            .with_parameter(ParameterSpec::required("amount", ParamType::Number));

        let resolver = ParameterResolver::new();
        let resolution =
            resolver.resolve(&tool, "refund 120.50 please", &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(resolution.values["amount"], json!(120.5));
    }
}
