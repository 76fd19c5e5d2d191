//! # Key-Value Store
//!
//! The narrow slice of Redis the service uses, behind a trait so routes can
//! run against [`memory::MemoryStore`] in tests and
//! [`redis::RedisStore`] in production.
//!
//! Values are strings; structured records go through [`get_json`] and
//! [`set_json`].

pub mod memory;
pub mod redis;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Errors from the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection or command failure in the backend.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The key holds a value of another type.
    #[error("key {0} holds a value of the wrong type")]
    WrongType(String),

    /// A stored value could not be (de)serialized.
    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String, hash, and set operations over a shared key space.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `GET`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `SET`, with `PX` when `ttl` is given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// `GETDEL`: read and remove in one step.
    async fn take(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `DEL`. Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// `HGETALL`. An absent key is an empty map.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// `HSET` with one or more field/value pairs.
    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;

    /// `SADD`. Returns whether the member was new.
    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// `SMEMBERS`. An absent key is an empty set.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// `PING`, for readiness.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON value.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw, ttl).await
}

/// Key layout under the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

/// Prefix of session keys. Not affected by `REDIS_KEY_PREFIX`.
pub const SESSION_KEY_PREFIX: &str = "rgdm-session-";

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Uploaded presentation under a caller-chosen key.
    pub fn upload(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }

    /// Wallet address → user id index.
    pub fn user_wallet(&self, wallet: &str) -> String {
        format!("{}:user-wallet:{wallet}", self.prefix)
    }

    /// Profile hash of a user.
    pub fn user(&self, user_id: &str) -> String {
        format!("{}:user:{user_id}", self.prefix)
    }

    /// Short-lived token issued at login.
    pub fn login_token(&self, key: &str) -> String {
        format!("{}:login-token:{key}", self.prefix)
    }

    pub fn raid(&self, id: &uuid::Uuid) -> String {
        format!("{}:raid:{id}", self.prefix)
    }

    pub fn raids(&self) -> String {
        format!("{}:raids", self.prefix)
    }

    pub fn session(&self, sid: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{sid}")
    }
}
