//! harker - webhook relay for a multi-act interactive story bot

mod config;
mod gateway;
mod prompt;
mod telegram;

use std::net::SocketAddr;
use std::sync::Arc;

use harker_engine::{Narrator, NarratorConfig, SessionStore, StoryEngine};
use harker_llm::ChatClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::telegram::{ReplyTransport, TelegramApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("harker=info,harker_engine=info")),
        )
        .init();

    let config = config::Config::from_env()?;

    let store = Arc::new(
        SessionStore::connect(config.redis_url.as_deref(), config.session_ttl).await,
    );
    if !store.is_durable() {
        info!("running without a durable backend; sessions end with the process");
    }

    let mut client = ChatClient::new(&config.openai_api_key);
    if let Some(base_url) = &config.openai_base_url {
        client = client.with_base_url(base_url);
    }
    let narrator = Narrator::new(Arc::new(client), NarratorConfig::default());
    let engine = Arc::new(StoryEngine::new(store, narrator, &config.system_prompt));

    let transport: Arc<dyn ReplyTransport> = Arc::new(TelegramApi::new(&config.telegram_token)?);
    let state = gateway::AppState {
        engine,
        transport,
        secret: Arc::new(config.webhook_secret),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, gateway::router(state)).await?;
    Ok(())
}
