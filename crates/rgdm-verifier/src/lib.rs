#![deny(missing_docs)]
//! # rgdm-verifier: Presentation Verification
//!
//! Decides whether a presented credential's disclosed attributes match a
//! signature a trusted issuer anchored on the ledger earlier.
//!
//! ## Pipeline
//!
//! ```text
//! attributes ─reduce─▶ map ─JCS─▶ JSON literal ─keccak─▶ payloadHash
//! {publicKey, encPayloadHash, payloadHash} ─JCS─▶ jsonMessage ─keccak─▶ messageHash
//! registry.record(messageHash).signature + jsonMessage ─EIP-191 recover─▶ signer
//! signer == trusted key
//! ```
//!
//! ## Modules
//!
//! - [`config`]: environment-driven verifier configuration.
//! - [`message`]: payload hash and verification message encoding.
//! - [`recover`]: personal-message signing and signer recovery (secp256k1).
//! - [`registry`]: the [`SignatureRegistry`] collaborator and an in-memory implementation.
//! - [`evm`]: JSON-RPC `eth_call` implementation of the registry.
//! - [`verifier`]: the [`PresentationVerifier`] itself.

pub mod config;
pub mod evm;
pub mod message;
pub mod recover;
pub mod registry;
pub mod verifier;

pub use config::{VerifierConfig, VerifierConfigError};
pub use evm::EvmRegistryClient;
pub use message::{payload_hash, EncodedMessage, VerificationMessage};
pub use recover::{address_of, recover_personal_signer, sign_personal_message, RecoveryError};
pub use registry::{InMemoryRegistry, RegistryError, RegistryRecord, SignatureRegistry};
pub use verifier::{DynVerifier, PresentationVerifier, VerificationError};
