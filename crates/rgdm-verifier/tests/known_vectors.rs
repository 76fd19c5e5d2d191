//! # Known-Answer Vectors
//!
//! Hashes and signatures produced outside this workspace by the web3.js
//! toolchain the issuer signs with (`JSON.stringify(canonicalize(..))`,
//! `web3.utils.keccak256`, `web3.eth.accounts.sign`). Anchored signatures
//! only keep verifying while these values are reproduced exactly.

use std::sync::Arc;

use rgdm_core::{eip191_hash, reduce_attributes, Address, Keccak256Digest, Presentation};
use rgdm_verifier::{
    payload_hash, recover_personal_signer, DynVerifier, InMemoryRegistry, PresentationVerifier,
    SignatureRegistry, VerificationMessage,
};
use serde_json::json;

/// Account from the web3.js `eth.accounts` documentation, private key
/// `0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318`.
const WEB3_DOCS_ACCOUNT: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

/// `web3.eth.accounts.sign("Some data", <docs key>).signature`.
const SOME_DATA_SIGNATURE: &str = "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c";

const PARIS_SUBJECT: &str = "0xABC0000000000000000000000000000000000123";
const PARIS_PAYLOAD_HASH: &str =
    "0x6de46fee736fc7eb41bcad26238fc717f85a185a4159a6718b4d020b47005b36";
const PARIS_MESSAGE_HASH: &str =
    "0xa28859d399d7a38fea363f8a3dee62bf684ea49a9e0df3af6e3acec93427543e";
/// The docs account signing the Paris `jsonMessage`.
const PARIS_SIGNATURE: &str = "0xbb50e2d89a4ed70663d080659fe0ad4b9bc3e06c17a227433966cb59ceee020d0add1c1b3863e922082b1c1b7367b60fdcc78901e91e097524eecaf495c82e511b";

fn paris() -> Presentation {
    Presentation::from_value(json!({
        "credentialSubject": {
            "id": PARIS_SUBJECT,
            "issuerDomains": [{
                "data": {
                    "credentials": [{"name": "city", "value": "paris"}],
                    "payloadKeccak256CipherText": "0xdead"
                }
            }]
        }
    }))
    .unwrap()
}

#[test]
fn web3_hash_message_vectors() {
    assert_eq!(
        eip191_hash(b"Hello World").to_hex(),
        "0xa1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
    );
    assert_eq!(
        eip191_hash(b"Some data").to_hex(),
        "0x1da44b586eb0729ff70a73c326926f6ed5a25f5b056e7f47fbc6e58d86871655"
    );
}

#[test]
fn web3_signature_recovers_documented_account() {
    let recovered = recover_personal_signer("Some data", SOME_DATA_SIGNATURE).unwrap();
    assert_eq!(recovered.to_checksum(), WEB3_DOCS_ACCOUNT);
}

#[test]
fn paris_hashes_match_issuer_toolchain() {
    let presentation = paris();
    let domain = presentation.first_domain().unwrap();
    let attributes = reduce_attributes(domain.attributes().unwrap());

    let payload = payload_hash(&attributes).unwrap();
    assert_eq!(payload, PARIS_PAYLOAD_HASH);

    let encoded = VerificationMessage::new(PARIS_SUBJECT, "0xdead", payload)
        .encode()
        .unwrap();
    assert_eq!(
        encoded.json_message,
        format!(
            r#""{{\"encPayloadHash\":\"0xdead\",\"payloadHash\":\"{PARIS_PAYLOAD_HASH}\",\"publicKey\":\"{PARIS_SUBJECT}\"}}""#
        )
    );
    assert_eq!(encoded.message_hash.to_hex(), PARIS_MESSAGE_HASH);

    let signer = recover_personal_signer(&encoded.json_message, PARIS_SIGNATURE).unwrap();
    assert_eq!(signer.to_checksum(), WEB3_DOCS_ACCOUNT);
}

#[tokio::test]
async fn paris_presentation_verifies_against_anchored_record() {
    let trusted = Address::parse(WEB3_DOCS_ACCOUNT).unwrap();
    let registry = InMemoryRegistry::new(trusted.clone());
    registry.anchor(
        Keccak256Digest::from_hex(PARIS_MESSAGE_HASH).unwrap(),
        PARIS_SIGNATURE,
    );
    let registry: Arc<dyn SignatureRegistry> = Arc::new(registry);
    let verifier: DynVerifier = PresentationVerifier::new(registry, trusted);

    assert!(verifier.verify(&paris()).await.unwrap());
}
