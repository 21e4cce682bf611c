use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use super::BalanceStore;
use crate::{Balance, EngineError, ResultEngine, UserId};

const KEY_PREFIX: &str = "balance";

fn cache_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Cache(err.to_string())
}

/// [`BalanceStore`] backed by Redis. Balances are stored as JSON under
/// `balance:{user_id}` and expire through Redis' own TTL.
#[derive(Clone)]
pub struct RedisBalanceStore {
    redis: ConnectionManager,
}

impl RedisBalanceStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub async fn connect(url: &str) -> ResultEngine<Self> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        let redis = ConnectionManager::new(client).await.map_err(cache_error)?;
        Ok(Self::new(redis))
    }

    fn key(user_id: UserId) -> String {
        format!("{KEY_PREFIX}:{user_id}")
    }
}

/// A cached value that no longer decodes is treated as a miss.
fn decode(user_id: UserId, json: &str) -> Option<Balance> {
    match serde_json::from_str(json) {
        Ok(balance) => Some(balance),
        Err(err) => {
            tracing::warn!(user_id, "failed to deserialize cached balance: {err}");
            None
        }
    }
}

#[async_trait]
impl BalanceStore for RedisBalanceStore {
    async fn load(&self, user_id: UserId) -> ResultEngine<Option<Balance>> {
        let raw: Option<String> = self
            .redis
            .clone()
            .get(Self::key(user_id))
            .await
            .map_err(cache_error)?;

        Ok(raw.and_then(|json| decode(user_id, &json)))
    }

    async fn save(&self, user_id: UserId, balance: &Balance, ttl: Duration) -> ResultEngine<()> {
        let json = serde_json::to_string(balance).map_err(cache_error)?;
        let seconds = ttl.as_secs().max(1);
        let _: () = self
            .redis
            .clone()
            .set_ex(Self::key(user_id), json, seconds)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn remove(&self, user_id: UserId) -> ResultEngine<()> {
        let _: () = self
            .redis
            .clone()
            .del(Self::key(user_id))
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}
