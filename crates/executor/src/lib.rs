//! HTTP executor
//!
//! Turns a `ToolDescriptor` plus resolved parameters into an HTTP request and
//! maps the response into the typed failure taxonomy. The executor is
//! stateless between calls; retry policy lives with the caller.

pub mod http;
pub mod template;

pub use http::{HttpExecutor, HttpExecutorConfig};

use thiserror::Error;

/// URL or header template errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),
}
