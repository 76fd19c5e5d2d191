//! # Personal-Message Signatures
//!
//! secp256k1 signing and recovery over EIP-191 personal messages, the scheme
//! the issuer uses when it anchors a presentation.
//!
//! Signatures are 65 bytes, hex encoded: `r || s || v`. `v` may be 27/28 or
//! 0/1. High-`s` signatures are normalized before recovery, flipping the
//! recovery parity to match.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rgdm_core::{eip191_hash, keccak256, Address};

/// Errors recovering a signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// Not hex, with or without `0x`.
    #[error("signature is not valid hex: {0}")]
    InvalidHex(String),

    /// Wrong byte length.
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    /// `v` outside 0, 1, 27, 28.
    #[error("unsupported recovery byte: {0}")]
    InvalidRecoveryId(u8),

    /// `r` or `s` out of range.
    #[error("malformed signature: {0}")]
    InvalidSignature(String),

    /// No public key recovers from the signature.
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Only raised by [`sign_personal_message`].
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Recover the address that signed `message` as a personal message.
pub fn recover_personal_signer(message: &str, signature: &str) -> Result<Address, RecoveryError> {
    let raw = signature.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|e| RecoveryError::InvalidHex(e.to_string()))?;
    if bytes.len() != 65 {
        return Err(RecoveryError::InvalidLength(bytes.len()));
    }

    let v = bytes[64];
    let mut parity = match v {
        0 | 27 => 0u8,
        1 | 28 => 1u8,
        other => return Err(RecoveryError::InvalidRecoveryId(other)),
    };

    let mut sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| RecoveryError::InvalidSignature(e.to_string()))?;
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        parity ^= 1;
    }
    let recovery_id = RecoveryId::from_byte(parity).ok_or(RecoveryError::InvalidRecoveryId(v))?;

    let digest = eip191_hash(message.as_bytes());
    let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &sig, recovery_id)
        .map_err(|e| RecoveryError::RecoveryFailed(e.to_string()))?;
    Ok(address_of(&key))
}

/// Ledger address of a public key: last 20 bytes of keccak256(X || Y).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Sign `message` as a personal message; returns `0x`-prefixed `r || s || v`
/// with `v` in {27, 28}.
pub fn sign_personal_message(key: &SigningKey, message: &str) -> Result<String, RecoveryError> {
    let digest = eip191_hash(message.as_bytes());
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| RecoveryError::SigningFailed(e.to_string()))?;
    let mut bytes = sig.to_bytes().to_vec();
    bytes.push(27 + recovery_id.to_byte());
    Ok(format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(last_byte: u8) -> SigningKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last_byte;
        SigningKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn known_key_address() {
        assert_eq!(
            address_of(key(1).verifying_key()).to_checksum(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn sign_then_recover() {
        let signer = key(7);
        let signature = sign_personal_message(&signer, "\"{\\\"a\\\":1}\"").unwrap();
        let recovered = recover_personal_signer("\"{\\\"a\\\":1}\"", &signature).unwrap();
        assert_eq!(recovered, address_of(signer.verifying_key()));
    }

    #[test]
    fn zero_based_recovery_byte_is_accepted() {
        let signer = key(3);
        let signature = sign_personal_message(&signer, "hello").unwrap();
        let mut bytes = hex::decode(&signature[2..]).unwrap();
        bytes[64] -= 27;
        let recovered = recover_personal_signer("hello", &hex::encode(bytes)).unwrap();
        assert_eq!(recovered, address_of(signer.verifying_key()));
    }

    #[test]
    fn different_message_recovers_different_signer() {
        let signer = key(5);
        let signature = sign_personal_message(&signer, "hello").unwrap();
        if let Ok(addr) = recover_personal_signer("hellO", &signature) {
            assert_ne!(addr, address_of(signer.verifying_key()));
        }
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert!(matches!(
            recover_personal_signer("m", "0xzz"),
            Err(RecoveryError::InvalidHex(_))
        ));
        assert_eq!(
            recover_personal_signer("m", "0x1234"),
            Err(RecoveryError::InvalidLength(2))
        );
        let mut bad_v = vec![1u8; 64];
        bad_v.push(35);
        assert_eq!(
            recover_personal_signer("m", &hex::encode(bad_v)),
            Err(RecoveryError::InvalidRecoveryId(35))
        );
        let mut zero = vec![0u8; 64];
        zero.push(27);
        assert!(matches!(
            recover_personal_signer("m", &hex::encode(zero)),
            Err(RecoveryError::InvalidSignature(_))
        ));
    }
}
