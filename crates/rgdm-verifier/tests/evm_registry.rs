//! # Integration Tests for the EVM Registry Client
//!
//! Runs [`EvmRegistryClient`] against a wiremock JSON-RPC node to check
//! request construction, ABI decoding, and error mapping, then drives a full
//! verification through it.

use std::sync::Arc;

use k256::ecdsa::SigningKey;
use rgdm_core::{keccak256, reduce_attributes, Presentation};
use rgdm_verifier::{
    address_of, payload_hash, sign_personal_message, DynVerifier, EvmRegistryClient,
    PresentationVerifier, RegistryError, SignatureRegistry, VerificationMessage, VerifierConfig,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c0";
const OWNER_SELECTOR: &str = "0x8da5cb5b";

fn client(server: &MockServer, trusted: &str) -> EvmRegistryClient {
    let mut config = VerifierConfig::new(&server.uri(), CONTRACT, trusted).expect("config");
    config.timeout_secs = 5;
    EvmRegistryClient::new(&config).expect("client")
}

fn rpc_result(hex_data: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": hex_data}))
}

/// ABI return data for a `(string)` tuple.
fn abi_string(s: &str) -> String {
    let mut out = format!("{:064x}{:064x}", 32, s.len());
    let mut data = hex::encode(s.as_bytes());
    while data.len() % 64 != 0 {
        data.push('0');
    }
    out.push_str(&data);
    format!("0x{out}")
}

fn owner_word() -> String {
    format!("0x{:0>64}", "ab".repeat(20))
}

const TRUSTED_PLACEHOLDER: &str = "0x0000000000000000000000000000000000000001";

#[tokio::test]
async fn owner_is_decoded_from_eth_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_call",
            "params": [{"to": CONTRACT, "data": OWNER_SELECTOR}, "latest"]
        })))
        .respond_with(rpc_result(owner_word()))
        .expect(1)
        .mount(&server)
        .await;

    let owner = client(&server, TRUSTED_PLACEHOLDER).owner().await.expect("owner");
    assert_eq!(owner.as_str(), format!("0x{}", "ab".repeat(20)));
}

#[tokio::test]
async fn record_is_decoded_and_empty_slot_is_none() {
    let server = MockServer::start().await;
    let hash = keccak256("message");
    let calldata = format!("0x{}{}", &hex::encode(&keccak256("payloads(bytes32)").as_bytes()[..4]), &hash.to_hex()[2..]);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "params": [{"data": calldata}]
        })))
        .respond_with(rpc_result(abi_string("0xfeed")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(abi_string("")))
        .mount(&server)
        .await;

    let registry = client(&server, TRUSTED_PLACEHOLDER);
    let record = registry.record(&hash).await.expect("record").expect("present");
    assert_eq!(record.signature, "0xfeed");
    assert!(registry.record(&keccak256("other")).await.expect("record").is_none());
}

#[tokio::test]
async fn rpc_error_object_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32000, "message": "execution reverted"}
        })))
        .mount(&server)
        .await;

    let err = client(&server, TRUSTED_PLACEHOLDER).owner().await.unwrap_err();
    match err {
        RegistryError::Rpc { method, reason } => {
            assert_eq!(method, "eth_call");
            assert_eq!(reason, "execution reverted");
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server, TRUSTED_PLACEHOLDER).owner().await.unwrap_err();
    assert!(matches!(err, RegistryError::Unavailable { .. }));
}

#[tokio::test]
async fn missing_result_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1})))
        .mount(&server)
        .await;

    let err = client(&server, TRUSTED_PLACEHOLDER).owner().await.unwrap_err();
    assert!(matches!(err, RegistryError::Decode { .. }));
}

#[tokio::test]
async fn end_to_end_verification_over_json_rpc() {
    let mut key_bytes = [0u8; 32];
    key_bytes[31] = 9;
    let issuer = SigningKey::from_slice(&key_bytes).expect("key");
    let trusted = address_of(issuer.verifying_key());

    let presentation = Presentation::from_value(json!({
        "credentialSubject": {
            "id": "0xABC0000000000000000000000000000000000123",
            "issuerDomains": [{"data": {
                "credentials": [{"name": "city", "value": "paris"}],
                "payloadKeccak256CipherText": "0xdead"
            }}]
        }
    }))
    .expect("presentation");

    let attrs = reduce_attributes(presentation.first_domain().unwrap().attributes().unwrap());
    let encoded = VerificationMessage::new(
        presentation.subject_id(),
        "0xdead",
        payload_hash(&attrs).expect("hash"),
    )
    .encode()
    .expect("encode");
    let signature = sign_personal_message(&issuer, &encoded.json_message).expect("sign");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": [{"data": OWNER_SELECTOR}]})))
        .respond_with(rpc_result(owner_word()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(abi_string(&signature)))
        .mount(&server)
        .await;

    let registry: Arc<dyn SignatureRegistry> =
        Arc::new(client(&server, &trusted.to_checksum()));
    let verifier: DynVerifier = PresentationVerifier::new(registry, trusted);
    assert!(verifier.verify(&presentation).await.expect("verified"));
}
