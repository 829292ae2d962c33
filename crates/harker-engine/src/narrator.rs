//! Bounded wrapper around the completion call.
//!
//! The narrator is the only component that talks to the model. It
//! never returns an error: timeouts and failures are mapped to text
//! the player can be shown directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harker_llm::{ChatClient, CompletionRequest, Turn};
use tracing::{error, warn};

use crate::progression::ProgressionState;

/// In-universe line returned when the wall-clock bound expires
pub const FALLBACK_LINE: &str =
    "The narrator falls silent in a storm of static. Try your last action again.";

/// Seam over the completion endpoint, mockable in tests
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> harker_llm::Result<String>;
}

#[async_trait]
impl Completion for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> harker_llm::Result<String> {
        ChatClient::complete(self, request).await
    }
}

/// Model parameters and the two nested timeouts
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport-level timeout on the completion call
    pub call_timeout: Duration,
    /// Wall-clock bound around the whole operation; the caller always
    /// regains control within this, even if the transport timeout
    /// never fires. Clamped to at least `call_timeout`.
    pub overall_timeout: Duration,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 350,
            call_timeout: Duration::from_secs(30),
            overall_timeout: Duration::from_secs(35),
        }
    }
}

/// Issues bounded completion calls carrying history plus the derived
/// progression summary
pub struct Narrator {
    completion: Arc<dyn Completion>,
    config: NarratorConfig,
}

impl Narrator {
    pub fn new(completion: Arc<dyn Completion>, mut config: NarratorConfig) -> Self {
        if config.overall_timeout < config.call_timeout {
            config.overall_timeout = config.call_timeout;
        }
        Self { completion, config }
    }

    /// Produce the next narration. Always returns displayable text;
    /// failures of the underlying call are recovered here.
    pub async fn narrate(&self, history: &[Turn], state: &ProgressionState) -> String {
        let mut messages = history.to_vec();
        messages.push(Turn::system(state.summary()));

        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            timeout: self.config.call_timeout,
        };

        match tokio::time::timeout(
            self.config.overall_timeout,
            self.completion.complete(&request),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                if e.is_timeout() {
                    warn!("completion call hit the transport timeout: {e}");
                } else {
                    error!("completion call failed: {e}");
                }
                format!("Error talking to the model: {e}")
            }
            Err(_) => {
                warn!(
                    "completion call exceeded the {:?} wall-clock bound; abandoning it",
                    self.config.overall_timeout
                );
                FALLBACK_LINE.to_string()
            }
        }
    }
}
