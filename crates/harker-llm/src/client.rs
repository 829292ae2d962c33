//! OpenAI-compatible chat-completions client

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{CompletionRequest, Turn},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Non-streaming chat-completions client
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    /// Create a new client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the OPENAI_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Override the API base URL (proxies, compatible endpoints)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Issue one completion call and return the assistant text.
    ///
    /// The request's `timeout` applies at the transport level; callers
    /// wanting a wall-clock bound wrap this future themselves.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_request(request);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "issuing completion call"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), text));
        }

        let raw = response.text().await?;
        let completion: ChatResponse = serde_json::from_str(&raw)?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::UnexpectedResponse("response carried no choices".into()))
    }
}

fn build_request(request: &CompletionRequest) -> ChatRequest {
    ChatRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(wire_message).collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn wire_message(turn: &Turn) -> ChatMessage {
    ChatMessage {
        role: turn.role.as_str().to_string(),
        content: Some(turn.content.clone()),
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
