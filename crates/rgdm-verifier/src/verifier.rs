//! # Presentation Verifier
//!
//! Checks that the attributes a claimant presents now are the attributes the
//! trusted issuer signed then. No state is mutated.
//!
//! ## Outcomes
//!
//! - `Ok(true)`: the anchored signature recovers to the trusted key.
//! - `Ok(false)`: it recovers to some other key.
//! - `Err(VerificationError)`: any step could not complete. The error is
//!   opaque; the failing step is logged with `tracing` only.

use std::sync::Arc;

use rgdm_core::{reduce_attributes, Address, CanonicalizationError, Presentation};
use thiserror::Error;

use crate::message::{payload_hash, VerificationMessage};
use crate::recover::{recover_personal_signer, RecoveryError};
use crate::registry::{RegistryError, SignatureRegistry};

/// Verifier over a type-erased registry, as held by the API state.
pub type DynVerifier = PresentationVerifier<Arc<dyn SignatureRegistry>>;

/// Opaque verification failure returned to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to verify authenticity of presented data")]
pub struct VerificationError {
    _private: (),
}

impl VerificationError {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// Which step failed. Logged, never returned across the crate boundary.
#[derive(Error, Debug)]
pub(crate) enum VerificationFailure {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    RegistryUnavailable(#[from] RegistryError),

    #[error("no signature record at {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    RecoveryFailure(#[from] RecoveryError),
}

impl From<CanonicalizationError> for VerificationFailure {
    fn from(err: CanonicalizationError) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Verifies presentations against a signature registry and a trusted key.
#[derive(Debug, Clone)]
pub struct PresentationVerifier<R> {
    registry: R,
    trusted_key: Address,
}

impl<R: SignatureRegistry> PresentationVerifier<R> {
    /// Verifier accepting only signatures by `trusted_key`.
    pub fn new(registry: R, trusted_key: Address) -> Self {
        Self {
            registry,
            trusted_key,
        }
    }

    /// The only signer [`verify`](Self::verify) accepts.
    pub fn trusted_key(&self) -> &Address {
        &self.trusted_key
    }

    /// Verify a presentation. See the module docs for the three outcomes.
    pub async fn verify(&self, presentation: &Presentation) -> Result<bool, VerificationError> {
        match self.check(presentation).await {
            Ok(verified) => {
                tracing::info!(
                    subject = presentation.subject_id(),
                    verified,
                    "presentation checked against registry"
                );
                Ok(verified)
            }
            Err(failure) => {
                tracing::warn!(
                    subject = presentation.subject_id(),
                    error = %failure,
                    "failed when attempting to verify signature"
                );
                Err(VerificationError::new())
            }
        }
    }

    pub(crate) async fn check(
        &self,
        presentation: &Presentation,
    ) -> Result<bool, VerificationFailure> {
        let subject = presentation.subject_id();
        if subject.is_empty() {
            return Err(VerificationFailure::MalformedInput(
                "credentialSubject.id is empty".to_string(),
            ));
        }
        let domain = presentation.first_domain().ok_or_else(|| {
            VerificationFailure::MalformedInput(
                "credentialSubject.issuerDomains[0] is missing or not an issuer domain".to_string(),
            )
        })?;
        let attributes = domain.attributes().ok_or_else(|| {
            VerificationFailure::MalformedInput(
                "issuerDomains[0].data.credentials is missing".to_string(),
            )
        })?;
        let enc_payload_hash = domain
            .data
            .payload_keccak256_cipher_text
            .as_deref()
            .ok_or_else(|| {
                VerificationFailure::MalformedInput(
                    "issuerDomains[0].data.payloadKeccak256CipherText is missing".to_string(),
                )
            })?;

        let payload_hash = payload_hash(&reduce_attributes(attributes))?;
        let encoded =
            VerificationMessage::new(subject, enc_payload_hash, payload_hash).encode()?;
        tracing::debug!(message_hash = %encoded.message_hash, "computed message hash");

        // Independent reads; the owner is fetched for the audit log only.
        let (owner, record) = tokio::try_join!(
            self.registry.owner(),
            self.registry.record(&encoded.message_hash)
        )?;
        tracing::debug!(owner = %owner, "registry owner");

        let record = record
            .filter(|r| !r.signature.trim().is_empty())
            .ok_or_else(|| VerificationFailure::RecordNotFound(encoded.message_hash.to_hex()))?;

        let signer = recover_personal_signer(&encoded.json_message, &record.signature)?;
        Ok(signer == self.trusted_key)
    }
}
