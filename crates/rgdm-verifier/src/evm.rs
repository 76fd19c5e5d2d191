//! # EVM JSON-RPC Signature Registry
//!
//! Reads the signature registry contract through `eth_call` against any
//! EVM-compatible JSON-RPC endpoint.
//!
//! ## Contract Interface
//!
//! ```solidity
//! function owner() external view returns (address);
//! function payloads(bytes32 messageHash) external view returns (string signature, ...);
//! ```
//!
//! `payloads` is the public getter of a mapping to a struct whose first member
//! is the signature string. Only that member is decoded; any trailing members
//! are ignored. An unset mapping slot decodes to an empty string, which is
//! reported as "no record".
//!
//! ## Security
//!
//! Read-only: the client never sends transactions and holds no keys.

use rgdm_core::{keccak256, Address, Keccak256Digest};

use crate::config::VerifierConfig;
use crate::registry::{RegistryError, RegistryRecord, SignatureRegistry};

/// Solidity signature of the owner getter.
const OWNER_FN: &str = "owner()";
/// Solidity signature of the record getter.
const RECORD_FN: &str = "payloads(bytes32)";

/// ABI word size.
const WORD: usize = 32;

/// JSON-RPC client for the signature registry contract.
#[derive(Debug)]
pub struct EvmRegistryClient {
    client: reqwest::Client,
    endpoint: url::Url,
    contract: Address,
}

impl EvmRegistryClient {
    /// Build a client from the verifier configuration.
    pub fn new(config: &VerifierConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RegistryError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.registry_endpoint.clone(),
            contract: config.registry_contract.clone(),
        })
    }

    /// The registry contract address.
    pub fn contract(&self) -> &Address {
        &self.contract
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RegistryError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::Unavailable {
                        reason: format!("{method}: request timed out"),
                    }
                } else {
                    RegistryError::Unavailable {
                        reason: format!("{method}: {e}"),
                    }
                }
            })?;

        if !resp.status().is_success() {
            return Err(RegistryError::Unavailable {
                reason: format!("{method}: HTTP {}", resp.status()),
            });
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| RegistryError::Decode {
            reason: format!("{method}: invalid JSON response: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(RegistryError::Rpc {
                method: method.to_string(),
                reason: msg.to_string(),
            });
        }

        json.get("result").cloned().ok_or_else(|| RegistryError::Decode {
            reason: format!("{method}: JSON-RPC response missing 'result' field"),
        })
    }

    /// `eth_call` against the registry contract, returning the raw return data.
    async fn call(&self, calldata: String) -> Result<Vec<u8>, RegistryError> {
        let tx = serde_json::json!({
            "to": self.contract.as_str(),
            "data": calldata,
        });
        let result = self
            .rpc_call("eth_call", serde_json::json!([tx, "latest"]))
            .await?;
        let hex_str = result.as_str().ok_or_else(|| RegistryError::Decode {
            reason: "eth_call returned non-string result".to_string(),
        })?;
        decode_hex_data(hex_str)
    }
}

#[async_trait::async_trait]
impl SignatureRegistry for EvmRegistryClient {
    async fn owner(&self) -> Result<Address, RegistryError> {
        let data = self.call(encode_calldata(OWNER_FN, None)).await?;
        decode_address(&data)
    }

    async fn record(&self, hash: &Keccak256Digest) -> Result<Option<RegistryRecord>, RegistryError> {
        let data = self.call(encode_calldata(RECORD_FN, Some(hash))).await?;
        let signature = decode_leading_string(&data)?;
        if signature.is_empty() {
            return Ok(None);
        }
        Ok(Some(RegistryRecord { signature }))
    }
}

/// First four bytes of keccak256 of the function signature.
fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

/// ABI calldata: selector followed by an optional `bytes32` argument.
fn encode_calldata(signature: &str, arg: Option<&Keccak256Digest>) -> String {
    let mut out = format!("0x{}", hex::encode(selector(signature)));
    if let Some(digest) = arg {
        out.push_str(&hex::encode(digest.as_bytes()));
    }
    out
}

fn decode_hex_data(s: &str) -> Result<Vec<u8>, RegistryError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| RegistryError::Decode {
        reason: format!("return data is not hex: {e}"),
    })
}

/// Read an ABI word as a `usize`, rejecting values with high bits set.
fn word_as_usize(data: &[u8], at: usize) -> Result<usize, RegistryError> {
    let word = at
        .checked_add(WORD)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| RegistryError::Decode {
            reason: format!("return data truncated at byte {at}"),
        })?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(RegistryError::Decode {
            reason: format!("ABI word at byte {at} out of range"),
        });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(buf)).map_err(|_| RegistryError::Decode {
        reason: format!("ABI word at byte {at} out of range"),
    })
}

fn decode_address(data: &[u8]) -> Result<Address, RegistryError> {
    let word = data.get(..WORD).ok_or_else(|| RegistryError::Decode {
        reason: format!("owner() returned {} bytes, expected 32", data.len()),
    })?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::from_bytes(bytes))
}

/// Decode the first head word as the offset of a dynamic `string`.
fn decode_leading_string(data: &[u8]) -> Result<String, RegistryError> {
    let offset = word_as_usize(data, 0)?;
    let len = word_as_usize(data, offset)?;
    let start = offset + WORD;
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| RegistryError::Decode {
            reason: format!("string of length {len} exceeds return data"),
        })?;
    String::from_utf8(bytes.to_vec()).map_err(|e| RegistryError::Decode {
        reason: format!("signature is not UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ABI-encode a single-member `(string)` tuple.
    fn abi_string(s: &str) -> Vec<u8> {
        let mut out = vec![0u8; 31];
        out.push(0x20);
        let mut len = [0u8; 32];
        len[24..].copy_from_slice(&(s.len() as u64).to_be_bytes());
        out.extend_from_slice(&len);
        out.extend_from_slice(s.as_bytes());
        let pad = (WORD - s.len() % WORD) % WORD;
        out.extend(std::iter::repeat(0u8).take(pad));
        out
    }

    #[test]
    fn selectors() {
        assert_eq!(hex::encode(selector(OWNER_FN)), "8da5cb5b");
        assert_eq!(encode_calldata(OWNER_FN, None), "0x8da5cb5b");
    }

    #[test]
    fn record_calldata_appends_hash() {
        let hash = keccak256("m");
        let calldata = encode_calldata(RECORD_FN, Some(&hash));
        // 0x + 8 hex (selector) + 64 hex (hash)
        assert_eq!(calldata.len(), 74);
        assert!(calldata.ends_with(&hash.to_hex()[2..]));
    }

    #[test]
    fn decodes_owner_word() {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(&[0xab; 20]);
        let addr = decode_address(&word).unwrap();
        assert_eq!(addr.as_str(), format!("0x{}", "ab".repeat(20)));
        assert!(decode_address(&[0u8; 4]).is_err());
    }

    #[test]
    fn decodes_string_member() {
        let sig = format!("0x{}", "11".repeat(65));
        assert_eq!(decode_leading_string(&abi_string(&sig)).unwrap(), sig);
        assert_eq!(decode_leading_string(&abi_string("")).unwrap(), "");
    }

    #[test]
    fn decodes_string_followed_by_static_members() {
        // (string signature, uint256 timestamp): head = [offset=0x40, timestamp]
        let mut data = vec![0u8; 31];
        data.push(0x40);
        let mut ts = [0u8; 32];
        ts[31] = 7;
        data.extend_from_slice(&ts);
        let mut len = [0u8; 32];
        len[31] = 3;
        data.extend_from_slice(&len);
        data.extend_from_slice(b"0xa");
        data.extend(std::iter::repeat(0u8).take(29));
        assert_eq!(decode_leading_string(&data).unwrap(), "0xa");
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(decode_leading_string(&[]).is_err());
        let mut data = abi_string("abcdef");
        data.truncate(70);
        assert!(decode_leading_string(&data).is_err());
    }

    #[test]
    fn rejects_huge_offsets() {
        let data = vec![0xffu8; 64];
        assert!(matches!(
            decode_leading_string(&data),
            Err(RegistryError::Decode { .. })
        ));
    }
}
