//! # Keccak-256 Digests
//!
//! Defines [`Keccak256Digest`], the hash type used for payload hashes, message
//! hashes and registry keys, plus the EIP-191 personal-message hash used for
//! signature recovery.
//!
//! The hex form is always `0x`-prefixed lowercase, which is what the issuer
//! hashed and what the ledger uses as the record key.

use sha3::{Digest, Keccak256};

use crate::error::ValidationError;

/// Prefix applied to personal messages before hashing (EIP-191 version `0x45`).
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// A 32-byte Keccak-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keccak256Digest([u8; 32]);

impl Keccak256Digest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::InvalidDigest(s.to_string()))?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(stripped, &mut bytes)
            .map_err(|_| ValidationError::InvalidDigest(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for Keccak256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Keccak-256 over arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> Keccak256Digest {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    Keccak256Digest(hasher.finalize().into())
}

/// Keccak-256 over the UTF-8 bytes of a string, as `0x`-prefixed lowercase hex.
pub fn keccak256_hex(text: &str) -> String {
    keccak256(text.as_bytes()).to_hex()
}

/// EIP-191 personal-message hash:
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`.
///
/// `len` is the decimal byte length of the message.
pub fn eip191_hash(message: &[u8]) -> Keccak256Digest {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    Keccak256Digest(hasher.finalize().into())
}
