//! harker-llm: chat-completion wire client
//!
//! This crate provides the message types and the OpenAI-compatible
//! chat-completions client used by the narrative engine.

pub mod client;
pub mod error;
pub mod types;

pub use client::ChatClient;
pub use error::{Error, Result};
pub use types::{CompletionRequest, Role, Turn};
