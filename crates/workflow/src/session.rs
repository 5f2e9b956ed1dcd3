//! Session store
//!
//! Maps conversation ids to their state. Each conversation sits behind its
//! own async mutex so turns within a conversation are strictly sequential
//! while independent conversations proceed in parallel. Idle conversations
//! are dropped by an explicit sweep; the caller decides the sweep cadence.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use api_agent_core::ConversationState;

pub type SharedConversation = Arc<Mutex<ConversationState>>;

pub struct SessionManager {
    sessions: DashMap<String, SharedConversation>,
    idle_timeout: chrono::Duration,
}

impl SessionManager {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout: chrono::Duration::from_std(idle_timeout)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
        }
    }

    /// Look up a conversation, creating it when the id is unknown or absent.
    /// Returns the effective id and the shared state handle.
    pub fn get_or_create(&self, conversation_id: Option<&str>) -> (String, SharedConversation) {
        let id = conversation_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let state = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::debug!(conversation = %id, "new conversation");
                Arc::new(Mutex::new(ConversationState::new(id.clone())))
            })
            .clone();

        (id, state)
    }

    pub fn get(&self, conversation_id: &str) -> Option<SharedConversation> {
        self.sessions.get(conversation_id).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop conversations idle past the timeout. A conversation whose lock
    /// is held is mid-turn and never dropped. Returns how many were removed.
    pub fn sweep_idle(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, state| match state.try_lock() {
            Ok(state) => state.idle_for() < self.idle_timeout,
            Err(_) => true,
        });
        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "swept idle conversations");
        }
        removed
    }
}
