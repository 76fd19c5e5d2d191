//! # Ledger Addresses
//!
//! [`Address`] is the 20-byte account identifier used for the trusted issuer
//! key, the registry contract, and recovered signers.
//!
//! Addresses arrive in mixed case (EIP-55 checksummed or not). The newtype
//! stores the lowercase form so that equality is the case-insensitive
//! comparison signer checks require.

use serde::{Deserialize, Serialize};

use crate::digest::keccak256;
use crate::error::ValidationError;

/// A `0x`-prefixed, 40-hex-character account address, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address string. Any letter case is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let valid = trimmed.len() == 42
            && trimmed.starts_with("0x")
            && trimmed[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValidationError::InvalidAddress(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Build an address from its raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Lowercase `0x`-prefixed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// EIP-55 mixed-case checksum form.
    pub fn to_checksum(&self) -> String {
        let lower = &self.0[2..];
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = hash.as_bytes()[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}
