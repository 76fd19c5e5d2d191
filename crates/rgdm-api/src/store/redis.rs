//! Redis-backed [`KvStore`].
//!
//! One multiplexed [`ConnectionManager`] is shared by every handler; it is
//! cheap to clone and reconnects on its own after a dropped connection.

use std::collections::HashMap;
use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisError};
use async_trait::async_trait;

use super::{KvStore, StoreError};

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.kind() == ::redis::ErrorKind::TypeError {
            return Self::WrongType(err.to_string());
        }
        Self::Backend(err.to_string())
    }
}

/// Store over a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to `url` and verify the server answers.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        let store = Self { connection };
        store.ping().await?;
        tracing::info!("connected to Redis");
        Ok(store)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = ::redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            // PX rejects 0.
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            cmd.arg("PX").arg(millis);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = ::redis::cmd("GETDEL").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let removed: i64 = ::redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> =
            ::redis::cmd("HGETALL").arg(key).query_async(&mut conn).await?;
        Ok(fields)
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection.clone();
        let mut cmd = ::redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let _: i64 = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let added: i64 = ::redis::cmd("SADD")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await?;
        Ok(added > 0)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection.clone();
        let members: Vec<String> = ::redis::cmd("SMEMBERS").arg(key).query_async(&mut conn).await?;
        Ok(members)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
