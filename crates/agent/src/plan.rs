//! Tool selection and multi-call planning
//!
//! Single-intent requests take the shortlist head. Requests with explicit
//! task separators ("; ", "and also", "and then") are segmented and each
//! segment is matched to its best shortlist candidate by keyword overlap,
//! with shortlist rank as the tie-break. Planning is a pure function of its
//! inputs.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use api_agent_catalog::ToolCatalog;
use api_agent_core::RetrievalCandidate;

static TASK_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:;|\band also\b|\band then\b|\bafter that\b)\s*").unwrap());

/// One planned tool call: the candidate to invoke and the request fragment
/// parameters are resolved from
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    pub tool_id: String,
    pub segment: String,
}

fn overlap(segment: &str, document: &str) -> usize {
    let segment_words: HashSet<String> = segment
        .to_lowercase()
        .unicode_words()
        .map(str::to_string)
        .collect();
    document
        .to_lowercase()
        .unicode_words()
        .filter(|w| segment_words.contains(*w))
        .count()
}

/// Map a request onto shortlist candidates. Empty shortlist plans nothing.
pub fn plan_calls(
    message: &str,
    shortlist: &[RetrievalCandidate],
    catalog: &ToolCatalog,
) -> Vec<PlannedCall> {
    let Some(head) = shortlist.first() else {
        return Vec::new();
    };

    let segments: Vec<&str> = TASK_SEPARATOR
        .split(message)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() <= 1 {
        return vec![PlannedCall {
            tool_id: head.tool_id.clone(),
            segment: message.trim().to_string(),
        }];
    }

    segments
        .into_iter()
        .map(|segment| {
            // Strictly-greater keeps the better-ranked candidate on ties
            let mut best = (head, 0usize);
            for candidate in shortlist {
                if let Some(tool) = catalog.get(&candidate.tool_id) {
                    let score = overlap(segment, &tool.document());
                    if score > best.1 {
                        best = (candidate, score);
                    }
                }
            }
            PlannedCall {
                tool_id: best.0.tool_id.clone(),
                segment: segment.to_string(),
            }
        })
        .collect()
}
