//! # Signature Registry
//!
//! The ledger-backed record store the issuer anchors signatures in, seen
//! through the two read-only calls the verifier needs.
//!
//! Production uses [`crate::evm::EvmRegistryClient`]; tests and local runs use
//! [`InMemoryRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rgdm_core::{Address, Keccak256Digest};

/// A stored attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecord {
    /// Hex-encoded personal-message signature.
    pub signature: String,
}

/// Errors talking to the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Transport failure, timeout, or non-2xx response.
    #[error("registry unavailable: {reason}")]
    Unavailable {
        /// Underlying transport error.
        reason: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("registry call {method} failed: {reason}")]
    Rpc {
        /// JSON-RPC method that failed.
        method: String,
        /// The node's error message.
        reason: String,
    },

    /// The node answered but the payload could not be decoded.
    #[error("malformed registry response: {reason}")]
    Decode {
        /// What could not be decoded.
        reason: String,
    },
}

/// Read-only view of the signature registry.
#[async_trait]
pub trait SignatureRegistry: Send + Sync {
    /// The registry contract's owner.
    async fn owner(&self) -> Result<Address, RegistryError>;

    /// The record stored under `hash`, or `None` when nothing is stored there.
    async fn record(&self, hash: &Keccak256Digest) -> Result<Option<RegistryRecord>, RegistryError>;
}

#[async_trait]
impl<T: SignatureRegistry + ?Sized> SignatureRegistry for Arc<T> {
    async fn owner(&self) -> Result<Address, RegistryError> {
        (**self).owner().await
    }

    async fn record(&self, hash: &Keccak256Digest) -> Result<Option<RegistryRecord>, RegistryError> {
        (**self).record(hash).await
    }
}

/// Registry held in process memory.
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    owner: Address,
    records: Arc<RwLock<HashMap<Keccak256Digest, RegistryRecord>>>,
}

impl InMemoryRegistry {
    /// Empty registry reporting `owner` as the contract owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Anchor a signature under `hash`, replacing any previous record.
    pub fn anchor(&self, hash: Keccak256Digest, signature: impl Into<String>) {
        self.records.write().insert(
            hash,
            RegistryRecord {
                signature: signature.into(),
            },
        );
    }

    /// Number of anchored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether nothing has been anchored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SignatureRegistry for InMemoryRegistry {
    async fn owner(&self) -> Result<Address, RegistryError> {
        Ok(self.owner.clone())
    }

    async fn record(&self, hash: &Keccak256Digest) -> Result<Option<RegistryRecord>, RegistryError> {
        Ok(self.records.read().get(hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgdm_core::keccak256;

    fn owner() -> Address {
        Address::parse("0x0000000000000000000000000000000000000abc").unwrap()
    }

    #[tokio::test]
    async fn anchored_record_is_returned() {
        let registry = InMemoryRegistry::new(owner());
        let hash = keccak256("message");
        registry.anchor(hash, "0xsig");
        assert_eq!(
            registry.record(&hash).await.unwrap(),
            Some(RegistryRecord { signature: "0xsig".into() })
        );
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn unknown_hash_is_none() {
        let registry = InMemoryRegistry::new(owner());
        assert!(registry.record(&keccak256("nothing")).await.unwrap().is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn works_behind_dyn_arc() {
        let registry: Arc<dyn SignatureRegistry> = Arc::new(InMemoryRegistry::new(owner()));
        assert_eq!(registry.owner().await.unwrap(), owner());
    }
}
