//! # Verification Message
//!
//! Derives the two hashes the issuer computed when it anchored a signature:
//!
//! - `payloadHash` = keccak256(JSON literal of JCS(attribute map))
//! - `messageHash` = keccak256(`jsonMessage`), where `jsonMessage` is the JSON
//!   literal of JCS(`{publicKey, encPayloadHash, payloadHash}`)
//!
//! `jsonMessage` is also the exact text the issuer signed.

use rgdm_core::{keccak256, CanonicalJson, CanonicalizationError, Keccak256Digest};
use serde::Serialize;
use serde_json::{Map, Value};

/// Hash of the canonicalized, double-encoded attribute mapping.
pub fn payload_hash(attributes: &Map<String, Value>) -> Result<String, CanonicalizationError> {
    let literal = CanonicalJson::new(attributes)?.to_json_literal()?;
    Ok(keccak256(literal.as_bytes()).to_hex())
}

/// The three-field record the issuer signed. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMessage {
    /// Subject identity (`credentialSubject.id`), verbatim.
    pub public_key: String,
    /// `payloadKeccak256CipherText` as supplied by the claimant.
    pub enc_payload_hash: String,
    /// Output of [`payload_hash`].
    pub payload_hash: String,
}

/// `jsonMessage` and its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// Canonicalized-then-stringified message; the signed text.
    pub json_message: String,
    /// keccak256 of `json_message`; the registry key.
    pub message_hash: Keccak256Digest,
}

impl VerificationMessage {
    /// Assemble the message from its three fields.
    pub fn new(
        public_key: impl Into<String>,
        enc_payload_hash: impl Into<String>,
        payload_hash: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            enc_payload_hash: enc_payload_hash.into(),
            payload_hash: payload_hash.into(),
        }
    }

    /// Canonicalize, stringify, and hash.
    pub fn encode(&self) -> Result<EncodedMessage, CanonicalizationError> {
        let json_message = CanonicalJson::new(self)?.to_json_literal()?;
        let message_hash = keccak256(json_message.as_bytes());
        Ok(EncodedMessage {
            json_message,
            message_hash,
        })
    }
}
