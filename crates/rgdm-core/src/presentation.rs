//! # Credential Payloads
//!
//! Typed view of the presentation a WIDE wallet submits:
//!
//! ```text
//! { "credentialSubject": {
//!     "id": "0xABC...",
//!     "issuerDomains": [
//!       { "data": { "credentials": [{ "name": "city", "value": "paris" }],
//!                   "payloadKeccak256CipherText": "0xdead..." } }
//!     ] } }
//! ```
//!
//! `issuerDomains` entries may themselves be arrays of domains; callers that
//! need every domain use [`Presentation::flattened_domains`], which flattens
//! one level. Entries of any other shape are kept as raw JSON and skipped by
//! every reader. Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// A presented credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// The subject and its disclosed issuer domains.
    pub credential_subject: CredentialSubject,
}

/// Subject identity plus the issuer domains vouching for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// Subject identity, an address-like string. Kept verbatim: it is hashed.
    pub id: String,
    /// Issuer domains in presentation order.
    #[serde(default)]
    pub issuer_domains: Vec<IssuerDomainEntry>,
}

/// One entry of `issuerDomains`: a domain, a nested group of domains, or
/// anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssuerDomainEntry {
    /// A single issuer domain.
    Domain(IssuerDomain),
    /// A nested array of issuer domains.
    Group(Vec<IssuerDomain>),
    /// An entry no reader understands.
    Other(Value),
}

/// A named source of disclosed attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerDomain {
    /// Optional display name of the issuer domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The disclosed attributes and the ciphertext hash.
    pub data: DomainData,
}

/// Disclosed attribute bundle of an issuer domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainData {
    /// Ordered `{name, value}` pairs. `None` when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<Attribute>>,
    /// Keccak-256 of the encrypted payload, as supplied by the claimant.
    #[serde(
        default,
        rename = "payloadKeccak256CipherText",
        skip_serializing_if = "Option::is_none"
    )]
    pub payload_keccak256_cipher_text: Option<String>,
}

/// A disclosed claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Claim name, e.g. `city`.
    pub name: String,
    /// Claim value; usually a string but any JSON value is accepted.
    pub value: Value,
}

impl Presentation {
    /// Deserialize from an untyped JSON body.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value)
            .map_err(|e| ValidationError::MalformedPresentation(e.to_string()))
    }

    /// The subject identity.
    pub fn subject_id(&self) -> &str {
        &self.credential_subject.id
    }

    /// The first entry of `issuerDomains`, if it is a single domain.
    ///
    /// A nested group in first position does not count: the verifier reads
    /// `issuerDomains[0].data` without flattening.
    pub fn first_domain(&self) -> Option<&IssuerDomain> {
        match self.credential_subject.issuer_domains.first()? {
            IssuerDomainEntry::Domain(domain) => Some(domain),
            IssuerDomainEntry::Group(_) | IssuerDomainEntry::Other(_) => None,
        }
    }

    /// All issuer domains with nested groups flattened one level.
    pub fn flattened_domains(&self) -> impl Iterator<Item = &IssuerDomain> {
        self.credential_subject
            .issuer_domains
            .iter()
            .flat_map(|entry| match entry {
                IssuerDomainEntry::Domain(domain) => std::slice::from_ref(domain),
                IssuerDomainEntry::Group(group) => group.as_slice(),
                IssuerDomainEntry::Other(_) => &[],
            })
    }

    /// A copy whose `issuerDomains` are the [`flattened_domains`](Self::flattened_domains).
    ///
    /// Lets a nested group in first position be read as `issuerDomains[0]`.
    pub fn flattened(&self) -> Self {
        Self {
            credential_subject: CredentialSubject {
                id: self.credential_subject.id.clone(),
                issuer_domains: self
                    .flattened_domains()
                    .cloned()
                    .map(IssuerDomainEntry::Domain)
                    .collect(),
            },
        }
    }

    /// Case-insensitive lookup of a claim in the first issuer domain.
    pub fn find_attribute(&self, name: &str) -> Option<&Value> {
        self.first_domain()?
            .attributes()?
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| &a.value)
    }
}

impl IssuerDomain {
    /// The attribute list, if present.
    pub fn attributes(&self) -> Option<&[Attribute]> {
        self.data.credentials.as_deref()
    }
}

/// Reduce ordered `{name, value}` pairs to a mapping.
///
/// Names are matched case-sensitively; a repeated name keeps the value of its
/// last occurrence.
pub fn reduce_attributes(attributes: &[Attribute]) -> Map<String, Value> {
    let mut map = Map::new();
    for attribute in attributes {
        map.insert(attribute.name.clone(), attribute.value.clone());
    }
    map
}
