//! # Verifiable Credential Envelope
//!
//! [`VerifiableCredential`] follows the W3C VC Data Model 2.0 field names
//! (`@context`, `type`, `validFrom`, `validUntil`). The envelope is rigid;
//! `credentialSubject` is a type parameter so the status list credential
//! can carry a typed [`BitstringStatusList`](crate::BitstringStatusList)
//! while foreign documents parse as plain JSON.
//!
//! Unknown top-level members (`name`, `description`, `proof`, …) are
//! accepted on input: a verifier must be able to read any conforming
//! status list credential, not only the ones this engine rendered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base context of the VC Data Model 2.0. It defines the bitstring status
/// list terms, so no extra context is needed for status list documents.
pub const VC_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";

/// Type every verifiable credential carries.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Errors from reading or interpreting credential documents.
#[derive(Error, Debug)]
pub enum VcError {
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `type` member did not hold the expected value.
    #[error("expected type {expected}, found {found}")]
    UnexpectedType {
        /// Type required at this position.
        expected: &'static str,
        /// Type actually present.
        found: String,
    },

    /// `statusListIndex` is not a non-negative decimal integer.
    #[error("statusListIndex must be a decimal string, got {0:?}")]
    InvalidStatusListIndex(String),
}

/// A W3C Verifiable Credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential<S = serde_json::Value> {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: ContextValue,

    /// Credential identifier; for status list credentials, the URL the
    /// document is published at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential type(s). MUST include `"VerifiableCredential"`.
    #[serde(rename = "type")]
    pub credential_type: CredentialTypeValue,

    /// The issuer, as a bare identifier or a profile object.
    pub issuer: Issuer,

    /// Start of the validity period.
    #[serde(rename = "validFrom", default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity period.
    #[serde(rename = "validUntil", default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    /// The credential subject.
    #[serde(rename = "credentialSubject")]
    pub credential_subject: S,

    /// Proof attached by the issuer's signer, preserved verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
}

impl<S> VerifiableCredential<S> {
    /// Whether the validity period has ended at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| until <= now)
    }
}

/// JSON-LD `@context` value: either a single string or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Single context URI string.
    Single(String),
    /// Array of context URI strings or objects.
    Array(Vec<serde_json::Value>),
}

impl Default for ContextValue {
    fn default() -> Self {
        Self::Array(vec![serde_json::Value::String(VC_V2_CONTEXT.to_string())])
    }
}

/// Credential `type` value: either a single string or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialTypeValue {
    /// Single type string.
    Single(String),
    /// Array of type strings.
    Array(Vec<String>),
}

impl CredentialTypeValue {
    /// Check whether `ty` is one of the credential's types.
    pub fn contains(&self, ty: &str) -> bool {
        match self {
            CredentialTypeValue::Single(s) => s == ty,
            CredentialTypeValue::Array(arr) => arr.iter().any(|s| s == ty),
        }
    }

    /// Check whether `"VerifiableCredential"` is included in the type.
    pub fn contains_vc_type(&self) -> bool {
        self.contains(VERIFIABLE_CREDENTIAL_TYPE)
    }
}

/// Issuer of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    /// Bare issuer identifier (DID or URL).
    Id(String),
    /// Issuer profile object with at least an `id`.
    Profile(IssuerProfile),
}

impl Issuer {
    /// The issuer identifier, whichever form was used.
    pub fn id(&self) -> &str {
        match self {
            Issuer::Id(id) => id,
            Issuer::Profile(profile) => &profile.id,
        }
    }
}

impl From<&str> for Issuer {
    fn from(id: &str) -> Self {
        Issuer::Id(id.to_string())
    }
}

impl From<IssuerProfile> for Issuer {
    fn from(profile: IssuerProfile) -> Self {
        Issuer::Profile(profile)
    }
}

/// Issuer profile as embedded in a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerProfile {
    /// Issuer identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Homepage of the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> VerifiableCredential {
        VerifiableCredential {
            context: ContextValue::default(),
            id: Some("https://issuer.example/status-lists/1".to_string()),
            credential_type: CredentialTypeValue::Array(vec![
                VERIFIABLE_CREDENTIAL_TYPE.to_string(),
                "BitstringStatusListCredential".to_string(),
            ]),
            issuer: Issuer::from("did:web:issuer.example"),
            valid_from: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            valid_until: None,
            credential_subject: json!({"type": "BitstringStatusList"}),
            proof: None,
        }
    }

    #[test]
    fn json_field_names_match_vc_v2() {
        let val = serde_json::to_value(sample()).unwrap();
        assert_eq!(val["@context"], json!([VC_V2_CONTEXT]));
        assert_eq!(val["validFrom"], json!("2026-01-01T00:00:00Z"));
        assert!(val.get("validUntil").is_none());
        assert!(val.get("proof").is_none());
        assert!(val.get("credentialSubject").is_some());
        assert!(val.get("credential_subject").is_none());
    }

    #[test]
    fn signed_document_keeps_proof_and_ignores_extra_members() {
        let doc = json!({
            "@context": VC_V2_CONTEXT,
            "type": ["VerifiableCredential"],
            "issuer": {"id": "did:web:issuer.example", "name": "Example University"},
            "name": "Status list",
            "credentialSubject": {},
            "proof": {"type": "DataIntegrityProof", "proofValue": "z3FXQ"}
        });
        let vc: VerifiableCredential = serde_json::from_value(doc).unwrap();
        assert_eq!(vc.issuer.id(), "did:web:issuer.example");
        assert!(vc.credential_type.contains_vc_type());
        assert_eq!(vc.proof.unwrap()["type"], "DataIntegrityProof");
    }

    #[test]
    fn issuer_profile_serializes_as_object() {
        let issuer = Issuer::from(IssuerProfile {
            id: "https://issuer.example".to_string(),
            name: Some("Example".to_string()),
            url: None,
        });
        assert_eq!(
            serde_json::to_value(issuer).unwrap(),
            json!({"id": "https://issuer.example", "name": "Example"})
        );
    }

    #[test]
    fn expiry_is_inclusive_of_valid_until() {
        let mut vc = sample();
        let until = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert!(!vc.is_expired_at(until));
        vc.valid_until = Some(until);
        assert!(vc.is_expired_at(until));
        assert!(!vc.is_expired_at(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()));
    }
}
