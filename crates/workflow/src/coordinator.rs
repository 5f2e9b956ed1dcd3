//! Turn state machine

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::Instrument;

use api_agent_agent::{AgentError, ExecutionAgent};
use api_agent_catalog::ToolIndexer;
use api_agent_config::WorkflowSettings;
use api_agent_core::{
    ClarifyReason, Domain, DomainSet, EventSink, NullSink, PendingClarification,
    ResponseSynthesizer, RetrievalCandidate, ToolInvocation, TransitionEvent, TurnOutcome,
    TurnRecord,
};
use api_agent_router::{DomainRouter, RouterError};

use crate::messages;
use crate::session::SessionManager;
use crate::WorkflowError;

/// States a turn moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Routing,
    Retrieving,
    Executing,
    Responding,
    Clarifying,
    Failed,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Routing => "routing",
            TurnPhase::Retrieving => "retrieving",
            TurnPhase::Executing => "executing",
            TurnPhase::Responding => "responding",
            TurnPhase::Clarifying => "clarifying",
            TurnPhase::Failed => "failed",
        }
    }
}

/// What the caller gets back for one user message
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub conversation_id: String,
    pub response: String,
    pub outcome: TurnOutcome,
}

/// Working result of one turn before it is appended to the conversation
struct TurnDraft {
    selected_domain: Option<Domain>,
    shortlist: Vec<RetrievalCandidate>,
    invocations: Vec<ToolInvocation>,
    response: String,
    outcome: TurnOutcome,
    path: Vec<String>,
    pending: Option<PendingClarification>,
}

/// Emits one `TransitionEvent` per phase change, timing each phase
struct Tracker<'a> {
    sink: &'a dyn EventSink,
    conversation_id: &'a str,
    turn_index: usize,
    current: TurnPhase,
    since: Instant,
}

impl<'a> Tracker<'a> {
    fn new(sink: &'a dyn EventSink, conversation_id: &'a str, turn_index: usize) -> Self {
        Self {
            sink,
            conversation_id,
            turn_index,
            current: TurnPhase::Idle,
            since: Instant::now(),
        }
    }

    fn advance(&mut self, to: TurnPhase, outcome: Option<String>) {
        self.sink.record(&TransitionEvent {
            conversation_id: self.conversation_id.to_string(),
            turn_index: self.turn_index,
            from: self.current.as_str(),
            to: to.as_str(),
            latency_ms: self.since.elapsed().as_millis() as u64,
            outcome,
        });
        self.current = to;
        self.since = Instant::now();
    }
}

/// Sequences Routing, Retrieving, Executing and Responding for every turn,
/// with Clarifying and Failed branches.
///
/// One coordinator serves all conversations. Turns within a conversation are
/// strictly sequential; independent conversations run concurrently. The whole
/// traversal of one turn sits under a single timeout.
pub struct WorkflowCoordinator {
    domains: DomainSet,
    router: DomainRouter,
    indexer: ToolIndexer,
    agent: ExecutionAgent,
    synthesizer: Arc<dyn ResponseSynthesizer>,
    sink: Arc<dyn EventSink>,
    sessions: SessionManager,
    settings: WorkflowSettings,
    top_k: usize,
}

impl WorkflowCoordinator {
    pub fn new(
        domains: DomainSet,
        router: DomainRouter,
        indexer: ToolIndexer,
        agent: ExecutionAgent,
        synthesizer: Arc<dyn ResponseSynthesizer>,
    ) -> Self {
        let settings = WorkflowSettings::default();
        Self {
            domains,
            router,
            indexer,
            agent,
            synthesizer,
            sink: Arc::new(NullSink),
            sessions: SessionManager::new(settings.session_idle_timeout()),
            settings,
            top_k: 10,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.sessions = SessionManager::new(settings.session_idle_timeout());
        self.settings = settings;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Process one user message and return the turn's reply.
    ///
    /// Every failure mode becomes a user-visible reply; internal errors never
    /// escape this method.
    pub async fn process_message(&self, conversation_id: Option<&str>, message: &str) -> TurnReply {
        let (id, shared) = self.sessions.get_or_create(conversation_id);
        let mut state = shared.lock().await;

        let turn_index = state.turn_count();
        let started_at = Utc::now();
        let clock = Instant::now();

        // A pending clarification folds its context into this turn
        let (text, carried, excluded, rounds) = match state.pending.take() {
            Some(p) => (
                format!("{} {}", p.carried_text, message),
                p.carried_parameters,
                p.excluded_domains,
                p.rounds,
            ),
            None => (message.to_string(), BTreeMap::new(), Vec::new(), 0),
        };
        let prior_domain = state.last_domain().cloned();
        let remembered = state.remembered_parameters();

        let span = tracing::info_span!("turn", conversation = %id, turn = turn_index);
        // The tracker outlives the turn future so a cancelled turn still
        // reports its final transition
        let mut tracker = Tracker::new(self.sink.as_ref(), &id, turn_index);
        let result = tokio::time::timeout(
            self.settings.turn_timeout(),
            self.run_turn(
                &mut tracker,
                &text,
                prior_domain.as_ref(),
                &carried,
                &remembered,
                excluded,
                rounds,
            )
            .instrument(span),
        )
        .await;
        let draft = match result {
            Ok(draft) => draft,
            Err(_) => {
                let error = WorkflowError::TimeoutExceeded(self.settings.turn_timeout());
                tracing::warn!(conversation = %id, turn = turn_index, "turn timed out");
                tracker.advance(TurnPhase::Failed, Some("timeout".to_string()));
                TurnDraft {
                    selected_domain: None,
                    shortlist: Vec::new(),
                    invocations: Vec::new(),
                    response: messages::failure_message(&error),
                    outcome: TurnOutcome::Failed {
                        reason: "turn timeout".to_string(),
                    },
                    path: vec!["timeout".to_string()],
                    pending: None,
                }
            }
        };

        let latency_ms = clock.elapsed().as_millis() as u64;
        let retries: u64 = draft
            .invocations
            .iter()
            .map(|i| i.attempts.saturating_sub(1) as u64)
            .sum();
        if retries > 0 {
            metrics::counter!("executor_retries_total").increment(retries);
        }
        metrics::counter!("turns_total").increment(1);
        if matches!(draft.outcome, TurnOutcome::Failed { .. }) {
            metrics::counter!("turn_failures_total").increment(1);
        }
        metrics::histogram!("turn_duration_ms").record(latency_ms as f64);

        let reply = TurnReply {
            conversation_id: id,
            response: draft.response.clone(),
            outcome: draft.outcome.clone(),
        };

        state.pending = draft.pending;
        state.push_turn(TurnRecord {
            user_message: message.to_string(),
            selected_domain: draft.selected_domain,
            shortlist: draft.shortlist,
            invocations: draft.invocations,
            response: draft.response,
            outcome: draft.outcome,
            path: draft.path,
            started_at,
            latency_ms,
        });

        reply
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_turn(
        &self,
        tracker: &mut Tracker<'_>,
        text: &str,
        prior_domain: Option<&Domain>,
        carried: &BTreeMap<String, Value>,
        remembered: &BTreeMap<String, Value>,
        mut excluded: Vec<Domain>,
        rounds: u32,
    ) -> TurnDraft {
        let mut path = Vec::new();
        let mut reroutes: u32 = 0;

        loop {
            tracker.advance(TurnPhase::Routing, None);
            let routing = match self
                .router
                .route(text, &self.domains, prior_domain, &excluded)
                .await
            {
                Ok(routing) => routing,
                Err(RouterError::AmbiguousDomain) => {
                    return self.clarify(
                        ClarifyReason::AmbiguousDomain,
                        text,
                        carried,
                        excluded,
                        rounds,
                        path,
                        tracker,
                    );
                }
                Err(RouterError::NoDomainsRemaining) => {
                    return self.clarify(
                        ClarifyReason::NoMatchingTool,
                        text,
                        carried,
                        excluded,
                        rounds,
                        path,
                        tracker,
                    );
                }
                Err(error @ RouterError::Classifier(_)) => {
                    return Self::fail(error.into(), path, tracker);
                }
            };
            path.push(format!("routing:{}", routing.domain));

            tracker.advance(
                TurnPhase::Retrieving,
                Some(format!("domain={}", routing.domain)),
            );
            let shortlist = match self.indexer.retrieve(&routing.domain, text, self.top_k).await {
                Ok(shortlist) => shortlist,
                Err(error) => return Self::fail(error.into(), path, tracker),
            };
            path.push(format!("retrieve:{}", shortlist.len()));

            if shortlist.is_empty() {
                excluded.push(routing.domain.clone());
                reroutes += 1;
                if reroutes > self.settings.max_reroutes {
                    return self.clarify(
                        ClarifyReason::NoMatchingTool,
                        text,
                        carried,
                        excluded,
                        rounds,
                        path,
                        tracker,
                    );
                }
                path.push("reroute".to_string());
                continue;
            }

            tracker.advance(
                TurnPhase::Executing,
                Some(format!("candidates={}", shortlist.len())),
            );
            match self.agent.run(text, &shortlist, carried, remembered).await {
                Ok(invocations) => {
                    let all_ok = invocations.iter().all(|i| i.outcome.is_success());
                    let any_ok = invocations.iter().any(|i| i.outcome.is_success());

                    if !any_ok {
                        // Retries are already spent inside the agent; nothing
                        // succeeded, so the turn is a failure, not an answer
                        path.push("execute:failed".to_string());
                        let response = match self.synthesizer.synthesize(text, &invocations).await {
                            Ok(response) => response,
                            Err(error) => {
                                messages::failure_message(&WorkflowError::Synthesis(error))
                            }
                        };
                        tracker.advance(TurnPhase::Failed, Some("executor failure".to_string()));
                        return TurnDraft {
                            selected_domain: Some(routing.domain),
                            shortlist,
                            invocations,
                            response,
                            outcome: TurnOutcome::Failed {
                                reason: "tool execution failed".to_string(),
                            },
                            path,
                            pending: None,
                        };
                    }
                    path.push(format!("execute:{}", if all_ok { "ok" } else { "partial" }));

                    tracker.advance(TurnPhase::Responding, None);
                    let response = match self.synthesizer.synthesize(text, &invocations).await {
                        Ok(response) => response,
                        Err(error) => {
                            return Self::fail(WorkflowError::Synthesis(error), path, tracker)
                        }
                    };
                    path.push("respond".to_string());
                    tracker.advance(TurnPhase::Idle, Some("completed".to_string()));

                    return TurnDraft {
                        selected_domain: Some(routing.domain),
                        shortlist,
                        invocations,
                        response,
                        outcome: TurnOutcome::Completed,
                        path,
                        pending: None,
                    };
                }
                Err(AgentError::NoCandidate) => {
                    excluded.push(routing.domain.clone());
                    reroutes += 1;
                    if reroutes > self.settings.max_reroutes {
                        return self.clarify(
                            ClarifyReason::NoMatchingTool,
                            text,
                            carried,
                            excluded,
                            rounds,
                            path,
                            tracker,
                        );
                    }
                    path.push("reroute".to_string());
                    continue;
                }
                Err(AgentError::MissingParameters { tool_id, missing, resolved }) => {
                    // Values that did resolve survive the clarification round
                    let mut merged = carried.clone();
                    merged.extend(resolved);
                    let mut draft = self.clarify(
                        ClarifyReason::MissingParameters { tool_id, missing },
                        text,
                        &merged,
                        excluded,
                        rounds,
                        path,
                        tracker,
                    );
                    if matches!(draft.outcome, TurnOutcome::Clarifying) {
                        draft.selected_domain = Some(routing.domain);
                        draft.shortlist = shortlist;
                    }
                    return draft;
                }
                Err(error) => return Self::fail(error.into(), path, tracker),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn clarify(
        &self,
        reason: ClarifyReason,
        text: &str,
        carried: &BTreeMap<String, Value>,
        excluded: Vec<Domain>,
        rounds: u32,
        mut path: Vec<String>,
        tracker: &mut Tracker<'_>,
    ) -> TurnDraft {
        let label = match &reason {
            ClarifyReason::AmbiguousDomain => "ambiguous_domain",
            ClarifyReason::NoMatchingTool => "no_matching_tool",
            ClarifyReason::MissingParameters { .. } => "missing_parameters",
        };

        if rounds >= self.settings.max_clarification_rounds {
            path.push("clarify:exhausted".to_string());
            tracker.advance(TurnPhase::Failed, Some("clarification rounds exhausted".into()));
            return TurnDraft {
                selected_domain: None,
                shortlist: Vec::new(),
                invocations: Vec::new(),
                response: messages::clarification_exhausted(),
                outcome: TurnOutcome::Failed {
                    reason: "clarification rounds exhausted".to_string(),
                },
                path,
                pending: None,
            };
        }

        path.push(format!("clarify:{label}"));
        tracker.advance(TurnPhase::Clarifying, Some(label.to_string()));
        let question = messages::clarification_question(&reason, &self.domains, self.indexer.catalog());

        TurnDraft {
            selected_domain: None,
            shortlist: Vec::new(),
            invocations: Vec::new(),
            response: question,
            outcome: TurnOutcome::Clarifying,
            path,
            pending: Some(PendingClarification {
                reason,
                rounds: rounds + 1,
                carried_text: text.to_string(),
                carried_parameters: carried.clone(),
                excluded_domains: excluded,
            }),
        }
    }

    fn fail(error: WorkflowError, mut path: Vec<String>, tracker: &mut Tracker<'_>) -> TurnDraft {
        tracing::error!(%error, "turn failed");
        path.push("failed".to_string());
        tracker.advance(TurnPhase::Failed, Some(error.to_string()));

        TurnDraft {
            selected_domain: None,
            shortlist: Vec::new(),
            invocations: Vec::new(),
            response: messages::failure_message(&error),
            outcome: TurnOutcome::Failed {
                reason: error.to_string(),
            },
            path,
            pending: None,
        }
    }
}
