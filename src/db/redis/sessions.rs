use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use uuid::Uuid;

use crate::db::repository::SessionStore;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Token(String),
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::Token(token) => write!(f, "session:{}", token),
        }
    }
}

/// Creates a Redis client for the session store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Session store keeping `session:<token> -> user id` with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_client: Client,
}

impl RedisSessionStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create_session(&self, token: &str, user_id: Uuid, ttl_secs: u64) -> AppResult<()> {
        let key = SessionKey::Token(token.to_string());
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        // SETEX rejects a zero expiry
        let _: () = conn
            .set_ex(key.to_string(), user_id.to_string(), ttl_secs.max(1))
            .await?;
        tracing::debug!(user_id = %user_id, ttl = ttl_secs, "Session stored");
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> AppResult<Option<Uuid>> {
        let key = SessionKey::Token(token.to_string());
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(key.to_string()).await?;

        match stored {
            Some(value) => match Uuid::parse_str(&value) {
                Ok(user_id) => Ok(Some(user_id)),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed session entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn revoke_session(&self, token: &str) -> AppResult<()> {
        let key = SessionKey::Token(token.to_string());
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key.to_string()).await?;
        Ok(())
    }
}
