//! Default event sink

use api_agent_core::{EventSink, TransitionEvent};

/// Sink that logs each transition via `tracing` and bumps a labeled counter
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &TransitionEvent) {
        tracing::info!(
            conversation = %event.conversation_id,
            turn = event.turn_index,
            from = event.from,
            to = event.to,
            latency_ms = event.latency_ms,
            outcome = event.outcome.as_deref(),
            "transition"
        );
        metrics::counter!("workflow_transitions_total", "to" => event.to).increment(1);
    }
}
