//! reqwest-backed executor

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use api_agent_core::{
    ApiExecutor, ExecutorFailure, ParamLocation, ToolDescriptor,
};

use crate::template::{render_header, render_url, value_fragment};

/// Parameter names lifted into a bearer Authorization header
const BEARER_PARAMS: [&str; 2] = ["api_key", "auth_token"];

#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: "api-agent/0.1".to_string(),
        }
    }
}

impl HttpExecutorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Everything needed to issue one request, computed before any I/O
#[derive(Debug)]
struct RequestPlan {
    url: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

fn plan_request(
    tool: &ToolDescriptor,
    parameters: &BTreeMap<String, Value>,
) -> Result<RequestPlan, ExecutorFailure> {
    let invalid = |message: String| ExecutorFailure::Remote { code: 400, message };

    let url = render_url(&tool.url, parameters)
        .map_err(|e| invalid(format!("{}: {}", tool.id, e)))?;

    let mut headers = Vec::new();
    for spec in &tool.headers {
        let value = render_header(&spec.value, parameters)
            .map_err(|e| invalid(format!("{}: header {}: {}", tool.id, spec.key, e)))?;
        headers.push((spec.key.clone(), value));
    }

    let mut query = Vec::new();
    let mut body = serde_json::Map::new();
    for (name, value) in parameters {
        if BEARER_PARAMS.contains(&name.as_str()) {
            let has_auth = headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("authorization"));
            if !has_auth {
                headers.push(("Authorization".to_string(), format!("Bearer {}", value_fragment(value))));
            }
            continue;
        }

        let location = tool
            .parameter(name)
            .map(|p| p.location)
            .unwrap_or(ParamLocation::Query);
        match location {
            // Path values are already consumed by the URL template
            ParamLocation::Path => {}
            ParamLocation::Query => query.push((name.clone(), value_fragment(value))),
            ParamLocation::Header => headers.push((name.clone(), value_fragment(value))),
            ParamLocation::Body => {
                body.insert(name.clone(), value.clone());
            }
        }
    }

    let body = if tool.method.has_body() && !body.is_empty() {
        Some(Value::Object(body))
    } else {
        None
    };

    Ok(RequestPlan { url, headers, query, body })
}

fn failure_from_status(code: u16, message: String) -> ExecutorFailure {
    match code {
        429 => ExecutorFailure::RateLimited,
        401 | 403 => ExecutorFailure::Auth(message),
        _ => ExecutorFailure::Remote { code, message },
    }
}

fn failure_from_transport(error: reqwest::Error) -> ExecutorFailure {
    if error.is_timeout() {
        ExecutorFailure::Timeout
    } else if error.is_connect() {
        ExecutorFailure::Remote {
            code: 503,
            message: format!("connection error: {error}"),
        }
    } else {
        ExecutorFailure::Remote {
            code: 502,
            message: error.to_string(),
        }
    }
}

/// Executor issuing real HTTP calls via a shared connection pool
pub struct HttpExecutor {
    client: Client,
    config: HttpExecutorConfig,
}

impl HttpExecutor {
    pub fn new(config: HttpExecutorConfig) -> Result<Self, api_agent_core::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| api_agent_core::Error::Invalid(format!("http client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpExecutorConfig {
        &self.config
    }
}

#[async_trait]
impl ApiExecutor for HttpExecutor {
    async fn execute(
        &self,
        tool: &ToolDescriptor,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<Value, ExecutorFailure> {
        let plan = plan_request(tool, parameters)?;

        let method = reqwest::Method::from_bytes(tool.method.as_str().as_bytes())
            .unwrap_or(reqwest::Method::GET);
        let mut request = self.client.request(method, &plan.url);
        for (key, value) in &plan.headers {
            request = request.header(key, value);
        }
        if !plan.query.is_empty() {
            request = request.query(&plan.query);
        }
        if let Some(body) = &plan.body {
            request = request.json(body);
        }

        tracing::debug!(tool = %tool.id, method = %tool.method, url = %plan.url, "executing tool call");

        let response = request.send().await.map_err(failure_from_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(failure_from_transport)?;

        if !status.is_success() {
            let failure = failure_from_status(status.as_u16(), text);
            tracing::warn!(tool = %tool.id, status = status.as_u16(), "tool call failed");
            return Err(failure);
        }

        // Non-JSON bodies are wrapped rather than rejected
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_agent_core::{HttpMethod, ParamType, ParameterSpec};

    fn tool() -> ToolDescriptor {
        ToolDescriptor::new("get_invoice", "Get Invoice", "INVOICING", "Fetch one invoice")
            .with_endpoint(HttpMethod::Get, "https://api.example.com/invoices/{invoice_id}")
            .with_header("Accept", "application/json")
            .with_parameter(
                ParameterSpec::required("invoice_id", ParamType::Text).at(ParamLocation::Path),
            )
            .with_parameter(ParameterSpec::optional("expand", ParamType::Text))
    }

    fn params(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_plan_path_and_query_split() {
        let plan = plan_request(
            &tool(),
            &params(&[("invoice_id", json!("inv_1")), ("expand", json!("lines"))]),
        )
        .unwrap();

        assert_eq!(plan.url, "https://api.example.com/invoices/inv_1");
        assert_eq!(plan.query, vec![("expand".to_string(), "lines".to_string())]);
        assert!(plan.body.is_none());
    }

    #[test]
    fn test_plan_body_for_post() {
        let tool = ToolDescriptor::new("create_dispute", "Create Dispute", "DISPUTES", "Open a dispute")
            .with_endpoint(HttpMethod::Post, "https://api.example.com/disputes")
            .with_parameter(
                ParameterSpec::required("payment_id", ParamType::Text).at(ParamLocation::Body),
            )
            .with_parameter(
                ParameterSpec::required("amount", ParamType::Number).at(ParamLocation::Body),
            );

        let plan = plan_request(
            &tool,
            &params(&[("payment_id", json!("pay_9")), ("amount", json!(120.5))]),
        )
        .unwrap();

        assert_eq!(
            plan.body,
            Some(json!({ "payment_id": "pay_9", "amount": 120.5 }))
        );
        assert!(plan.query.is_empty());
    }

    #[test]
    fn test_bearer_injection() {
        let plan = plan_request(
            &tool(),
            &params(&[("invoice_id", json!("inv_1")), ("api_key", json!("sk-test"))]),
        )
        .unwrap();

        assert!(plan
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer sk-test"));
        assert!(plan.query.iter().all(|(k, _)| k != "api_key"));
    }

    #[test]
    fn test_bearer_does_not_override_existing_auth() {
        let tool = tool().with_header("Authorization", "Bearer static-token");
        let plan = plan_request(
            &tool,
            &params(&[("invoice_id", json!("inv_1")), ("api_key", json!("sk-test"))]),
        )
        .unwrap();

        let auth: Vec<&(String, String)> = plan
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].1, "Bearer static-token");
    }

    #[test]
    fn test_header_param_interpolation() {
        let tool = ToolDescriptor::new("whoami", "Who Am I", "USER_MANAGEMENT", "Current user")
            .with_endpoint(HttpMethod::Get, "https://api.example.com/me")
            .with_header("X-Tenant", "{tenant}");

        let plan = plan_request(&tool, &params(&[("tenant", json!("acme"))])).unwrap();
        assert!(plan.headers.iter().any(|(k, v)| k == "X-Tenant" && v == "acme"));
    }

    #[test]
    fn test_missing_path_param_is_permanent_failure() {
        let failure = plan_request(&tool(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(failure, ExecutorFailure::Remote { code: 400, .. }));
        assert!(!failure.is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            failure_from_status(429, "slow down".into()),
            ExecutorFailure::RateLimited
        ));
        assert!(matches!(
            failure_from_status(401, "bad key".into()),
            ExecutorFailure::Auth(_)
        ));
        assert!(matches!(
            failure_from_status(404, "missing".into()),
            ExecutorFailure::Remote { code: 404, .. }
        ));
        assert!(failure_from_status(503, "down".into()).is_retryable());
        assert!(!failure_from_status(404, "missing".into()).is_retryable());
    }
}
