//! Response synthesis trait

use async_trait::async_trait;

use crate::invocation::ToolInvocation;
use crate::Result;

/// Turns invocation results into a natural-language answer.
///
/// The answer must be grounded in the actual results: on partial failure it
/// states which calls succeeded and which failed rather than dropping
/// results. Production implementations typically call an LLM; the in-repo
/// `TemplateSynthesizer` is a deterministic fallback.
#[async_trait]
pub trait ResponseSynthesizer: Send + Sync + 'static {
    async fn synthesize(&self, request: &str, invocations: &[ToolInvocation]) -> Result<String>;
}
