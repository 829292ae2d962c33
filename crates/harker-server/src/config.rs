//! Environment-sourced configuration, loaded once at startup.
//!
//! Missing credentials are startup errors; everything else has a
//! default. Nothing here is re-read after the process starts.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_SESSION_TTL_SEC: u64 = 60 * 60 * 24 * 7;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEBHOOK_SECRET: &str = "changeme";

/// Process configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential
    pub telegram_token: String,
    /// Completion endpoint credential
    pub openai_api_key: String,
    /// Shared webhook path secret. The default placeholder must be
    /// overridden in any real deployment.
    pub webhook_secret: String,
    /// Durable store connection string; absent means memory-only
    pub redis_url: Option<String>,
    /// TTL applied to every session record write
    pub session_ttl: Duration,
    /// Listen port
    pub port: u16,
    /// Override for OpenAI-compatible proxies
    pub openai_base_url: Option<String>,
    /// Narrative system prompt (built-in unless overridden by file)
    pub system_prompt: String,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = require(&lookup, "TELEGRAM_BOT_TOKEN")?;
        let openai_api_key = require(&lookup, "OPENAI_API_KEY")?;

        let webhook_secret =
            lookup("WEBHOOK_SECRET").unwrap_or_else(|| DEFAULT_WEBHOOK_SECRET.to_string());
        if webhook_secret == DEFAULT_WEBHOOK_SECRET {
            tracing::warn!("WEBHOOK_SECRET is the placeholder value; override it in production");
        }

        let session_ttl = match lookup("SESSION_TTL_SEC") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("SESSION_TTL_SEC is not a number: {raw:?}"))?,
            ),
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SEC),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT is not a port number: {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let system_prompt = match lookup("SYSTEM_PROMPT_FILE") {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("could not read SYSTEM_PROMPT_FILE {path:?}"))?,
            None => SYSTEM_PROMPT.to_string(),
        };

        Ok(Self {
            telegram_token,
            openai_api_key,
            webhook_secret,
            redis_url: lookup("REDIS_URL"),
            session_ttl,
            port,
            openai_base_url: lookup("OPENAI_BASE_URL"),
            system_prompt,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("required environment variable {key} is not set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("OPENAI_API_KEY", "sk-test"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(env(REQUIRED)).unwrap();
        assert_eq!(config.webhook_secret, "changeme");
        assert_eq!(config.session_ttl, Duration::from_secs(604800));
        assert_eq!(config.port, 8080);
        assert!(config.redis_url.is_none());
        assert!(config.system_prompt.contains("Dungeon Master"));
    }

    #[test]
    fn test_missing_bot_token_is_fatal() {
        let err = Config::from_lookup(env(&[("OPENAI_API_KEY", "sk-test")])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(env(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_empty_credential_counts_as_missing() {
        let err = Config::from_lookup(env(&[
            ("TELEGRAM_BOT_TOKEN", ""),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::from_lookup(env(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("OPENAI_API_KEY", "sk-test"),
            ("WEBHOOK_SECRET", "hushed"),
            ("SESSION_TTL_SEC", "3600"),
            ("PORT", "9000"),
            ("REDIS_URL", "redis://localhost:6379"),
        ]))
        .unwrap();
        assert_eq!(config.webhook_secret, "hushed");
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.port, 9000);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
    }

    #[test]
    fn test_bad_ttl_is_fatal() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SESSION_TTL_SEC", "soon"));
        assert!(Config::from_lookup(env(&pairs)).is_err());
    }
}
