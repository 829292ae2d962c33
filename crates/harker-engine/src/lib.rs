//! harker-engine: session and narrative progression engine
//!
//! This crate owns per-conversation state: the persisted message
//! history, the act/beat progression machine, the bounded narrator
//! wrapper around the completion client, and the turn pipeline that
//! ties them together.

pub mod engine;
pub mod history;
pub mod narrator;
pub mod progression;
pub mod store;

pub use engine::StoryEngine;
pub use history::HistoryManager;
pub use narrator::{Completion, Narrator, NarratorConfig, FALLBACK_LINE};
pub use progression::ProgressionState;
pub use store::SessionStore;
