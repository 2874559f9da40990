//! # Identity Newtypes
//!
//! Identifiers used by the status list engine. Each identifier is a
//! distinct type: a [`StatusListId`] cannot be passed where a
//! [`StatusEntryId`] is expected, and an [`IssuerId`] cannot be confused
//! with a [`CredentialId`].
//!
//! ## Validation
//!
//! UUID-based identifiers ([`StatusListId`], [`StatusEntryId`]) are always
//! valid by construction. String-based identifiers ([`IssuerId`],
//! [`CredentialId`]) reject blank values at construction and at
//! deserialization time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Implement `Deserialize` for string newtypes by routing the raw string
/// through the type's validating `new()` constructor.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Declare a UUID-backed identifier with the usual constructors and
/// conversions.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a status list. Assigned at creation, immutable, and
    /// the last path segment of the published status list credential URL.
    StatusListId
);

uuid_identifier!(
    /// Identifier of a per-credential status entry.
    StatusEntryId
);

/// Reference to the entity issuing credentials (typically a DID or an
/// issuer profile URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IssuerId(String);

impl IssuerId {
    /// Create an issuer identifier, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingIssuer);
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(IssuerId);

impl std::fmt::Display for IssuerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a credential whose status is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    /// Create a credential identifier, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::MissingCredential);
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_validating_deserialize!(CredentialId);

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_list_ids_are_unique() {
        assert_ne!(StatusListId::new(), StatusListId::new());
    }

    #[test]
    fn status_list_id_parses_its_display_form() {
        let id = StatusListId::new();
        let parsed: StatusListId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn status_list_id_serializes_as_bare_uuid() {
        let id = StatusListId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn issuer_id_rejects_blank() {
        assert_eq!(IssuerId::new(""), Err(ValidationError::MissingIssuer));
        assert_eq!(IssuerId::new("   "), Err(ValidationError::MissingIssuer));
        assert_eq!(
            IssuerId::new("").unwrap_err().to_string(),
            "issuerId is required"
        );
    }

    #[test]
    fn issuer_id_accepts_did() {
        let id = IssuerId::new("did:web:issuer.example").unwrap();
        assert_eq!(id.as_str(), "did:web:issuer.example");
    }

    #[test]
    fn credential_id_rejects_blank() {
        assert_eq!(CredentialId::new(""), Err(ValidationError::MissingCredential));
    }

    #[test]
    fn deserialize_rejects_blank_issuer() {
        let result: Result<IssuerId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
        let ok: IssuerId = serde_json::from_str("\"urn:uuid:1234\"").unwrap();
        assert_eq!(ok.as_str(), "urn:uuid:1234");
    }
}
