//! Observability sink trait
//!
//! The coordinator emits one structured event per state transition. Storage
//! and transport are out of scope; the default sink logs via `tracing`.

/// One state-machine transition
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub conversation_id: String,
    /// Zero-based turn index within the conversation
    pub turn_index: usize,
    pub from: &'static str,
    pub to: &'static str,
    /// Time spent in `from` before this transition
    pub latency_ms: u64,
    /// Outcome annotation, e.g. "domain=WEATHER" or "retry=1"
    pub outcome: Option<String>,
}

/// Consumer of transition events
pub trait EventSink: Send + Sync + 'static {
    fn record(&self, event: &TransitionEvent);
}

/// Sink that drops all events (tests, benchmarks)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &TransitionEvent) {}
}
