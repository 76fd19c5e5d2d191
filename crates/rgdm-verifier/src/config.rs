//! # Verifier Configuration
//!
//! Loaded from environment variables:
//!
//! | Variable            | Meaning                                        |
//! |---------------------|------------------------------------------------|
//! | `WEB3_ENDPOINT`     | JSON-RPC URL of the ledger node (required)     |
//! | `WIDE_CONTRACT`     | Address of the signature registry (required)   |
//! | `WIDE_PUB_KEY`      | Trusted issuer address (required)              |
//! | `WEB3_TIMEOUT_SECS` | Per-request timeout, default 30                |
//!
//! Missing or malformed values are errors. Nothing falls back to a default
//! except the timeout, and a malformed timeout is still an error.

use rgdm_core::Address;
use url::Url;

/// Default JSON-RPC request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the presentation verifier and its registry client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Ledger JSON-RPC endpoint.
    pub registry_endpoint: Url,
    /// Address of the deployed signature registry contract.
    pub registry_contract: Address,
    /// The only signer accepted as valid.
    pub trusted_issuer_key: Address,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl VerifierConfig {
    /// Build a configuration, validating every field.
    pub fn new(
        registry_endpoint: &str,
        registry_contract: &str,
        trusted_issuer_key: &str,
    ) -> Result<Self, VerifierConfigError> {
        Ok(Self {
            registry_endpoint: Url::parse(registry_endpoint).map_err(|e| {
                VerifierConfigError::Invalid("WEB3_ENDPOINT".to_string(), e.to_string())
            })?,
            registry_contract: Address::parse(registry_contract).map_err(|e| {
                VerifierConfigError::Invalid("WIDE_CONTRACT".to_string(), e.to_string())
            })?,
            trusted_issuer_key: Address::parse(trusted_issuer_key).map_err(|e| {
                VerifierConfigError::Invalid("WIDE_PUB_KEY".to_string(), e.to_string())
            })?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, VerifierConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, VerifierConfigError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VerifierConfigError::Missing(key.to_string()))
        };

        let mut config = Self::new(
            &required("WEB3_ENDPOINT")?,
            &required("WIDE_CONTRACT")?,
            &required("WIDE_PUB_KEY")?,
        )?;

        if let Some(raw) = lookup("WEB3_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                VerifierConfigError::Invalid("WEB3_TIMEOUT_SECS".to_string(), raw.clone())
            })?;
        }
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierConfigError {
    /// A required variable is unset or empty.
    #[error("{0} environment variable is required")]
    Missing(String),

    /// A variable is set but does not parse.
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}
