//! Per-conversation message history.
//!
//! Index 0 is always the single system instruction turn and is never
//! evicted. Every mutation persists before returning, so a crash
//! mid-turn loses at most the in-flight reply.

use std::sync::Arc;

use harker_llm::{Role, Turn};

use crate::progression::ProgressionState;
use crate::store::{history_key, state_key, SessionStore};

/// Retained-turn ceiling
const MAX_TURNS: usize = 80;
/// Turns kept after the system turn when trimming
const KEEP_RECENT: usize = 60;

/// Owns the ordered message log for each conversation
pub struct HistoryManager {
    store: Arc<SessionStore>,
    system_prompt: String,
}

impl HistoryManager {
    pub fn new(store: Arc<SessionStore>, system_prompt: impl Into<String>) -> Self {
        Self {
            store,
            system_prompt: system_prompt.into(),
        }
    }

    /// Fetch a conversation's history, seeding a fresh one on first
    /// contact. A brand-new conversation gets its progression state
    /// initialized at the same time: the two records live and die
    /// together.
    pub async fn get(&self, chat_id: i64) -> Vec<Turn> {
        if let Some(history) = self.store.get::<Vec<Turn>>(&history_key(chat_id)).await {
            if !history.is_empty() {
                return history;
            }
        }
        self.seed(chat_id).await
    }

    /// Append one turn, trim to the retention ceiling, persist.
    pub async fn append(&self, chat_id: i64, role: Role, content: impl Into<String>) {
        let mut history = self.get(chat_id).await;
        history.push(Turn {
            role,
            content: content.into(),
        });
        if history.len() > MAX_TURNS {
            let tail = history.split_off(history.len() - KEEP_RECENT);
            history.truncate(1);
            history.extend(tail);
        }
        self.store.set(&history_key(chat_id), &history).await;
    }

    /// Replace the history with a fresh system-turn-only log
    pub async fn reset(&self, chat_id: i64) {
        let fresh = vec![Turn::system(&self.system_prompt)];
        self.store.set(&history_key(chat_id), &fresh).await;
    }

    async fn seed(&self, chat_id: i64) -> Vec<Turn> {
        let fresh = vec![Turn::system(&self.system_prompt)];
        self.store.set(&history_key(chat_id), &fresh).await;
        let state: Option<ProgressionState> = self.store.get(&state_key(chat_id)).await;
        if state.is_none() {
            self.store
                .set(&state_key(chat_id), &ProgressionState::default())
                .await;
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "You are the narrator.";

    fn manager() -> HistoryManager {
        HistoryManager::new(Arc::new(SessionStore::in_memory()), PROMPT)
    }

    #[tokio::test]
    async fn test_first_access_seeds_system_turn_and_state() {
        let hm = manager();
        let history = hm.get(5).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[0].content, PROMPT);

        let state: Option<ProgressionState> = hm.store.get(&state_key(5)).await;
        let state = state.expect("progression state seeded with history");
        assert_eq!((state.act, state.beat), (1, 1));
        assert!(!state.awaiting_other);
    }

    #[tokio::test]
    async fn test_seed_does_not_clobber_existing_state() {
        let hm = manager();
        let mut advanced = ProgressionState::default();
        advanced.advance("1");
        hm.store.set(&state_key(5), &advanced).await;

        hm.get(5).await;
        let state: ProgressionState = hm.store.get(&state_key(5)).await.unwrap();
        assert_eq!(state, advanced);
    }

    #[tokio::test]
    async fn test_append_persists_in_order() {
        let hm = manager();
        hm.append(1, Role::User, "/start").await;
        hm.append(1, Role::Assistant, "Shall we begin?").await;

        let history = hm.get(1).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2].content, "Shall we begin?");
    }

    #[tokio::test]
    async fn test_trim_keeps_system_turn_and_recent_tail() {
        let hm = manager();
        for i in 0..100 {
            hm.append(1, Role::User, format!("turn {i}")).await;
        }

        let history = hm.get(1).await;
        assert!(history.len() <= MAX_TURNS);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[0].content, PROMPT);
        assert_eq!(history.last().unwrap().content, "turn 99");
        // the middle was dropped, not the leading instruction
        assert_eq!(history.len(), 1 + KEEP_RECENT);
    }

    #[tokio::test]
    async fn test_reset_returns_to_single_system_turn() {
        let hm = manager();
        hm.append(9, Role::User, "hello").await;
        hm.reset(9).await;
        let history = hm.get(9).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let hm = manager();
        hm.append(1, Role::User, "one").await;
        hm.append(2, Role::User, "two").await;
        assert_eq!(hm.get(1).await[1].content, "one");
        assert_eq!(hm.get(2).await[1].content, "two");
    }
}
