//! In-process [`KvStore`] for tests and local runs without Redis.
//!
//! Expiry is lazy: an expired key is dropped the next time it is touched.
//! The lock is `parking_lot` and is never held across an `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{KvStore, StoreError};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Thread-safe, cloneable in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Slot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.data.read().values().filter(|s| s.live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` on the live slot at `key`, purging it first if expired.
    fn with_slot<R>(&self, key: &str, f: impl FnOnce(Option<&Slot>) -> R) -> R {
        let now = Instant::now();
        let mut guard = self.data.write();
        if guard.get(key).is_some_and(|s| !s.live(now)) {
            guard.remove(key);
        }
        f(guard.get(key))
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_slot(key, |slot| match slot.map(|s| &s.value) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let slot = Slot {
            value: Value::Str(value.to_string()),
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.data.write().insert(key.to_string(), slot);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut guard = self.data.write();
        let Some(slot) = guard.remove(key) else {
            return Ok(None);
        };
        if !slot.live(now) {
            return Ok(None);
        }
        match slot.value {
            Value::Str(s) => Ok(Some(s)),
            other => {
                guard.insert(
                    key.to_string(),
                    Slot {
                        value: other,
                        expires_at: slot.expires_at,
                    },
                );
                Err(StoreError::WrongType(key.to_string()))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        Ok(self
            .data
            .write()
            .remove(key)
            .is_some_and(|slot| slot.live(now)))
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.with_slot(key, |slot| match slot.map(|s| &s.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        })
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut guard = self.data.write();
        let now = Instant::now();
        let slot = guard.entry(key.to_string()).or_insert_with(|| Slot {
            value: Value::Hash(HashMap::new()),
            expires_at: None,
        });
        if !slot.live(now) {
            *slot = Slot {
                value: Value::Hash(HashMap::new()),
                expires_at: None,
            };
        }
        match &mut slot.value {
            Value::Hash(h) => {
                h.extend(fields.iter().cloned());
                Ok(())
            }
            _ => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut guard = self.data.write();
        let now = Instant::now();
        let slot = guard.entry(key.to_string()).or_insert_with(|| Slot {
            value: Value::Set(BTreeSet::new()),
            expires_at: None,
        });
        if !slot.live(now) {
            *slot = Slot {
                value: Value::Set(BTreeSet::new()),
                expires_at: None,
            };
        }
        match &mut slot.value {
            Value::Set(s) => Ok(s.insert(member.to_string())),
            _ => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.with_slot(key, |slot| match slot.map(|s| &s.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(s)) => Ok(s.iter().cloned().collect()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
