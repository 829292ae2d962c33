//! Durable session store: Redis when available, in-process otherwise.
//!
//! The store is the system of record for serialized session records.
//! Every write also lands in an in-process mirror so a lost or absent
//! Redis backend degrades durability, never correctness. A stored
//! value that fails to deserialize is treated as missing.

use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Key for a conversation's progression state record
pub fn state_key(chat_id: i64) -> String {
    format!("state:{chat_id}")
}

/// Key for a conversation's history record
pub fn history_key(chat_id: i64) -> String {
    format!("hist:{chat_id}")
}

/// Key/value store for session records with TTL'd durable writes
pub struct SessionStore {
    backend: Option<ConnectionManager>,
    mirror: Mutex<HashMap<String, String>>,
    ttl_secs: u64,
    degraded: AtomicBool,
}

impl SessionStore {
    /// Connect to Redis if a URL is configured, otherwise (or on any
    /// connection failure) run memory-only. Never fails: backend
    /// unavailability is a degradation, not an error.
    pub async fn connect(redis_url: Option<&str>, ttl: Duration) -> Self {
        let backend = match redis_url {
            Some(url) => match Self::open_backend(url).await {
                Ok(conn) => {
                    info!("connected to Redis session backend");
                    Some(conn)
                }
                Err(e) => {
                    warn!("could not connect to Redis ({e}); falling back to in-memory state");
                    None
                }
            },
            None => None,
        };

        Self {
            backend,
            mirror: Mutex::new(HashMap::new()),
            ttl_secs: ttl.as_secs().max(1),
            degraded: AtomicBool::new(false),
        }
    }

    /// Memory-only store for tests and store-less deployments
    pub fn in_memory() -> Self {
        Self {
            backend: None,
            mirror: Mutex::new(HashMap::new()),
            ttl_secs: DEFAULT_TTL.as_secs(),
            degraded: AtomicBool::new(false),
        }
    }

    async fn open_backend(url: &str) -> redis::RedisResult<ConnectionManager> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(conn)
    }

    /// Fetch and deserialize a record. Prefers the durable backend;
    /// a miss, backend failure, or unparseable value falls through to
    /// the in-process mirror.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(conn) = &self.backend {
            let mut conn = conn.clone();
            match conn.get::<_, Option<String>>(key).await {
                Ok(Some(raw)) => {
                    if let Ok(value) = serde_json::from_str(&raw) {
                        return Some(value);
                    }
                    warn!("unparseable record at {key}; treating as absent");
                }
                Ok(None) => {}
                Err(e) => self.note_degraded(&e),
            }
        }

        let raw = self.mirror.lock().get(key).cloned()?;
        serde_json::from_str(&raw).ok()
    }

    /// Serialize and persist a record under the configured TTL. The
    /// mirror is always written; backend failures are logged once and
    /// swallowed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to serialize record for {key}: {e}");
                return;
            }
        };

        self.mirror.lock().insert(key.to_string(), payload.clone());

        if let Some(conn) = &self.backend {
            let mut conn = conn.clone();
            let written: redis::RedisResult<()> = conn.set_ex(key, payload, self.ttl_secs).await;
            if let Err(e) = written {
                self.note_degraded(&e);
            }
        }
    }

    /// Whether a durable backend is attached
    pub fn is_durable(&self) -> bool {
        self.backend.is_some()
    }

    fn note_degraded(&self, error: &redis::RedisError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!("Redis backend unavailable ({error}); continuing on in-memory state");
        }
    }

    #[cfg(test)]
    fn poison(&self, key: &str, raw: &str) {
        self.mirror.lock().insert(key.to_string(), raw.to_string());
    }
}
