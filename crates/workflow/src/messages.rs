//! User-facing message templates
//!
//! Every turn that does not complete still answers with a sentence the user
//! can act on. Raw internal errors never leak into these strings.

use api_agent_catalog::ToolCatalog;
use api_agent_core::{ClarifyReason, DomainSet};

use crate::WorkflowError;

/// The question emitted when a turn ends in `Clarifying`
pub fn clarification_question(
    reason: &ClarifyReason,
    domains: &DomainSet,
    catalog: &ToolCatalog,
) -> String {
    match reason {
        ClarifyReason::AmbiguousDomain => {
            let labels: Vec<&str> = domains.domains().map(|d| d.as_str()).collect();
            format!(
                "I'm not sure which area your request falls under. I can help with {}. Could you rephrase or add a bit more detail?",
                labels.join(", ")
            )
        }
        ClarifyReason::NoMatchingTool => {
            "I couldn't find an action that matches that request. Could you describe what you'd like to do differently?".to_string()
        }
        ClarifyReason::MissingParameters { tool_id, missing } => {
            let name = catalog
                .get(tool_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| tool_id.clone());
            format!(
                "To run {} I still need: {}. Could you provide {}?",
                name,
                missing.join(", "),
                if missing.len() == 1 { "it" } else { "them" }
            )
        }
    }
}

/// The message emitted when a turn ends in `Failed`
pub fn failure_message(error: &WorkflowError) -> String {
    match error {
        WorkflowError::TimeoutExceeded(_) => {
            "That took longer than expected and I had to stop. Please try again.".to_string()
        }
        WorkflowError::Agent(_) | WorkflowError::Routing(_) | WorkflowError::Retrieval(_) => {
            "Something went wrong while working on that request. Please try again.".to_string()
        }
        WorkflowError::Synthesis(_) => {
            "I completed the lookups but couldn't put an answer together. Please try again.".to_string()
        }
    }
}

/// Emitted when clarification rounds run out without a usable request
pub fn clarification_exhausted() -> String {
    "I still couldn't work out what to do from that. Let's start over with a fresh request.".to_string()
}
