//! Per-conversation state
//!
//! One `ConversationState` per active conversation, owned by the workflow
//! coordinator. Turns are append-only; the coordinator garbage-collects
//! conversations after an idle timeout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Domain;
use crate::invocation::ToolInvocation;
use crate::retrieval::RetrievalCandidate;

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Reached Responding; a grounded response was emitted
    Completed,
    /// Ended in Clarifying; a follow-up question was emitted
    Clarifying,
    /// Terminal failure for the turn; user-visible explanation emitted
    Failed { reason: String },
}

/// Why the coordinator is asking the user for more information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClarifyReason {
    /// No domain reached the confidence floor
    AmbiguousDomain,
    /// Retrieval came back empty in every domain tried
    NoMatchingTool,
    /// A tool was chosen but required parameters could not be resolved
    MissingParameters { tool_id: String, missing: Vec<String> },
}

/// Clarification context carried into the next turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingClarification {
    pub reason: ClarifyReason,
    /// Clarification rounds already spent on this request
    pub rounds: u32,
    /// Original request text, merged with the clarification reply
    pub carried_text: String,
    /// Parameters already resolved before clarification
    #[serde(default)]
    pub carried_parameters: BTreeMap<String, Value>,
    /// Domains excluded by earlier re-routing of this request
    #[serde(default)]
    pub excluded_domains: Vec<Domain>,
}

/// Record of one completed turn, kept for audit and multi-turn continuity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub user_message: String,
    pub selected_domain: Option<Domain>,
    /// Shortlist snapshot from retrieval
    #[serde(default)]
    pub shortlist: Vec<RetrievalCandidate>,
    #[serde(default)]
    pub invocations: Vec<ToolInvocation>,
    pub response: String,
    pub outcome: TurnOutcome,
    /// Stages visited, e.g. ["routing:WEATHER", "retrieve:2", "execute:ok"]
    #[serde(default)]
    pub path: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub latency_ms: u64,
}

/// State of one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: String,
    turns: Vec<TurnRecord>,
    /// Set when the last turn ended in Clarifying
    pub pending: Option<PendingClarification>,
    last_domain: Option<Domain>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.into(),
            turns: Vec::new(),
            pending: None,
            last_domain: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Append a finished turn. Turns are never removed or reordered.
    pub fn push_turn(&mut self, record: TurnRecord) {
        if let Some(domain) = &record.selected_domain {
            self.last_domain = Some(domain.clone());
        }
        self.turns.push(record);
        self.last_activity = Utc::now();
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Domain of the most recent turn that selected one
    pub fn last_domain(&self) -> Option<&Domain> {
        self.last_domain.as_ref()
    }

    /// Parameter values resolved by earlier turns, later turns winning.
    ///
    /// Lets a follow-up like "and tomorrow?" reuse the city resolved by the
    /// previous turn. Consulted only when the current message and the
    /// clarification carry-over say nothing.
    pub fn remembered_parameters(&self) -> BTreeMap<String, Value> {
        let mut remembered = BTreeMap::new();
        for turn in &self.turns {
            for invocation in &turn.invocations {
                for (name, value) in &invocation.parameters {
                    remembered.insert(name.clone(), value.clone());
                }
            }
        }
        remembered
    }

    /// Recent user messages, oldest first
    pub fn recent_user_messages(&self, n: usize) -> Vec<String> {
        let start = self.turns.len().saturating_sub(n);
        self.turns[start..]
            .iter()
            .map(|t| t.user_message.clone())
            .collect()
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time since the last turn or touch
    pub fn idle_for(&self) -> chrono::Duration {
        Utc::now() - self.last_activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str, domain: Option<&str>) -> TurnRecord {
        TurnRecord {
            user_message: message.to_string(),
            selected_domain: domain.map(Domain::new),
            shortlist: Vec::new(),
            invocations: Vec::new(),
            response: "ok".to_string(),
            outcome: TurnOutcome::Completed,
            path: vec!["routing".to_string()],
            started_at: Utc::now(),
            latency_ms: 5,
        }
    }

    #[test]
    fn test_append_only_turns() {
        let mut state = ConversationState::new("conv-1");
        state.push_turn(record("What's the weather in Paris?", Some("WEATHER")));
        state.push_turn(record("And tomorrow?", Some("WEATHER")));

        assert_eq!(state.turn_count(), 2);
        assert_eq!(state.last_domain(), Some(&Domain::new("WEATHER")));
        assert_eq!(
            state.recent_user_messages(1),
            vec!["And tomorrow?".to_string()]
        );
    }

    #[test]
    fn test_remembered_parameters_prefer_later_turns() {
        use serde_json::json;

        let invocation = |city: &str| {
            ToolInvocation::success(
                "get_forecast",
                [("city".to_string(), json!(city))].into_iter().collect(),
                json!({}),
                1,
            )
        };

        let mut state = ConversationState::new("conv-3");
        let mut first = record("weather in Paris today", Some("WEATHER"));
        first.invocations = vec![invocation("Paris")];
        let mut second = record("what about London", Some("WEATHER"));
        second.invocations = vec![invocation("London")];
        state.push_turn(first);
        state.push_turn(second);

        assert_eq!(state.remembered_parameters()["city"], json!("London"));
    }

    #[test]
    fn test_last_domain_survives_domainless_turn() {
        let mut state = ConversationState::new("conv-2");
        state.push_turn(record("weather please", Some("WEATHER")));
        state.push_turn(record("thanks", None));

        assert_eq!(state.last_domain(), Some(&Domain::new("WEATHER")));
    }
}
