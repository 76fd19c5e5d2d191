#![deny(missing_docs)]

//! # rgdm-core: Foundational Types for the rgdm Backend
//!
//! This crate defines the types every other crate in the workspace depends on.
//! It has no internal crate dependencies. External ones are `serde`,
//! `serde_json`, `thiserror`, `sha3`, and `hex`.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalJson`] is the sole path to content hashing.** Every hash that
//!    is compared against an anchored signature is computed from text produced
//!    by `CanonicalJson::new()`, which applies RFC 8785 (JCS) canonicalization.
//!
//! 2. **Hashes are Keccak-256.** [`Keccak256Digest`] is the only digest type;
//!    its hex form is `0x`-prefixed lowercase, matching what the ledger stores.
//!
//! 3. **Addresses compare case-insensitively.** [`Address`] normalizes to
//!    lowercase on construction so that `==` is the comparison the verifier
//!    needs.
//!
//! 4. **[`RgdmError`] hierarchy.** Structured errors with `thiserror`.
//!    No `Box<dyn Error>` and no `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod presentation;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalJson;
pub use digest::{eip191_hash, keccak256, keccak256_hex, Keccak256Digest};
pub use error::{CanonicalizationError, RgdmError, ValidationError};
pub use identity::Address;
pub use presentation::{
    reduce_attributes, Attribute, CredentialSubject, DomainData, IssuerDomain, IssuerDomainEntry,
    Presentation,
};
