//! Telegram transport adapter: inbound update envelope and outbound
//! reply delivery.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Fixed backoff before the single delivery retry
const RETRY_BACKOFF: Duration = Duration::from_millis(700);

/// Inbound webhook envelope (the fields this relay reads)
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Outbound reply delivery seam
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    /// Deliver one assistant reply
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Best-effort liveness indicator; failures are ignored
    async fn typing(&self, chat_id: i64);
}

/// Deliver a reply, retrying once after a fixed backoff
pub async fn deliver(transport: &dyn ReplyTransport, chat_id: i64, text: &str) -> Result<()> {
    if let Err(e) = transport.send(chat_id, text).await {
        warn!("reply delivery to chat {chat_id} failed once: {e}; retrying");
        tokio::time::sleep(RETRY_BACKOFF).await;
        transport.send(chat_id, text).await?;
    }
    Ok(())
}

/// Telegram Bot API transport
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self> {
        // The bot token is embedded in the URL; keep it out of logs.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        })
    }
}

#[async_trait]
impl ReplyTransport for TelegramApi {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("sendMessage request failed")?;
        response
            .error_for_status()
            .context("sendMessage rejected")?;
        Ok(())
    }

    async fn typing(&self, chat_id: i64) {
        let result = self
            .client
            .post(format!("{}/sendChatAction", self.base_url))
            .json(&json!({ "chat_id": chat_id, "action": "typing" }))
            .send()
            .await;
        if let Err(e) = result {
            warn!("sendChatAction failed for chat {chat_id}: {e}");
        }
    }
}
