//! The turn pipeline: user input in, displayable narration out.

use std::collections::HashMap;
use std::sync::Arc;

use harker_llm::Role;
use tracing::debug;

use crate::history::HistoryManager;
use crate::narrator::Narrator;
use crate::progression::ProgressionState;
use crate::store::{state_key, SessionStore};

/// Per-conversation turn locks.
///
/// A turn reads and rewrites both session records; interleaving two
/// turns for the same chat would race them. The gateway ack path never
/// touches these locks, only the dispatched work does.
struct ChatLocks {
    inner: parking_lot::Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChatLocks {
    fn new() -> Self {
        Self {
            inner: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn for_chat(&self, chat_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        self.inner
            .lock()
            .entry(chat_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// Drives one conversation turn end to end: history append, state
/// machine advance, bounded narration, assistant append.
pub struct StoryEngine {
    store: Arc<SessionStore>,
    history: HistoryManager,
    narrator: Narrator,
    locks: ChatLocks,
}

impl StoryEngine {
    pub fn new(store: Arc<SessionStore>, narrator: Narrator, system_prompt: impl Into<String>) -> Self {
        let history = HistoryManager::new(store.clone(), system_prompt);
        Self {
            store,
            history,
            narrator,
            locks: ChatLocks::new(),
        }
    }

    /// Process one inbound turn. Returns the reply to deliver, or
    /// `None` when the input warrants no reply (blank text, unknown
    /// commands).
    pub async fn handle_turn(&self, chat_id: i64, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let lock = self.locks.for_chat(chat_id);
        let _guard = lock.lock().await;

        let command = text.split_whitespace().next().unwrap_or_default();
        match command {
            "/start" => {
                debug!(chat_id, "restarting session");
                self.history.reset(chat_id).await;
                self.store
                    .set(&state_key(chat_id), &ProgressionState::default())
                    .await;
                self.history.append(chat_id, Role::User, "/start").await;
            }
            "/continue" => {
                // resume without moving the beat counter
                self.history.append(chat_id, Role::User, "/continue").await;
            }
            _ if text.starts_with('/') => return None,
            _ => {
                self.history.append(chat_id, Role::User, text).await;
                let mut state = self.load_state(chat_id).await;
                state.advance(text);
                self.store.set(&state_key(chat_id), &state).await;
            }
        }

        let history = self.history.get(chat_id).await;
        let state = self.load_state(chat_id).await;
        let reply = self.narrator.narrate(&history, &state).await;
        self.history
            .append(chat_id, Role::Assistant, reply.as_str())
            .await;
        Some(reply)
    }

    async fn load_state(&self, chat_id: i64) -> ProgressionState {
        self.store
            .get(&state_key(chat_id))
            .await
            .unwrap_or_default()
    }
}
