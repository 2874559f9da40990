//! # Bitstring Status List Types
//!
//! Claim shapes from [Bitstring Status List v1.0]:
//!
//! - [`BitstringStatusListEntry`] is embedded as `credentialStatus` in an
//!   issued credential and points at one slot of one list.
//! - [`BitstringStatusList`] is the `credentialSubject` of the published
//!   status list credential and carries the compressed bitstring.
//!
//! `statusSize` and `statusMessages` appear on a list only when slots are
//! wider than one bit; single-bit lists have the implicit set/unset meaning.
//!
//! [Bitstring Status List v1.0]: https://www.w3.org/TR/vc-bitstring-status-list/

use serde::{Deserialize, Serialize};

use credstatus_core::{StatusPurpose, StatusSize};

use crate::credential::{VcError, VerifiableCredential};

/// `type` of a status list credential.
pub const BITSTRING_STATUS_LIST_CREDENTIAL_TYPE: &str = "BitstringStatusListCredential";

/// `type` of a status list credential subject.
pub const BITSTRING_STATUS_LIST_TYPE: &str = "BitstringStatusList";

/// `type` of a per-credential status entry.
pub const BITSTRING_STATUS_LIST_ENTRY_TYPE: &str = "BitstringStatusListEntry";

/// A status list credential with a typed subject.
pub type StatusListCredential = VerifiableCredential<BitstringStatusList>;

/// Meaning of one status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Code as an upper-case hex literal, e.g. `"0xA"`.
    pub status: String,
    /// Label for the code.
    pub message: String,
}

impl StatusMessage {
    /// Message for `code`, rendered with the `0x` hex convention.
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            status: format!("0x{code:X}"),
            message: message.into(),
        }
    }

    /// The numeric code, if `status` is a well-formed hex literal.
    pub fn code(&self) -> Option<u8> {
        let digits = self
            .status
            .strip_prefix("0x")
            .or_else(|| self.status.strip_prefix("0X"))?;
        u8::from_str_radix(digits, 16).ok()
    }
}

/// Status list descriptor: the `credentialSubject` of a status list
/// credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitstringStatusList {
    /// Subject identifier (`<list url>#list`) when part of a credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always [`BITSTRING_STATUS_LIST_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Purpose shared by every slot.
    pub status_purpose: StatusPurpose,

    /// Compressed, multibase-encoded bitstring.
    pub encoded_list: String,

    /// Milliseconds a verifier may cache the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    /// Bits per slot; absent means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_size: Option<StatusSize>,

    /// Meaning of every code; present only when `statusSize > 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_messages: Option<Vec<StatusMessage>>,
}

impl BitstringStatusList {
    /// Slot width, defaulting to one bit when absent.
    pub fn effective_status_size(&self) -> StatusSize {
        self.status_size.unwrap_or_default()
    }

    /// Fail unless `type` is `BitstringStatusList`.
    pub fn ensure_type(&self) -> Result<(), VcError> {
        if self.kind != BITSTRING_STATUS_LIST_TYPE {
            return Err(VcError::UnexpectedType {
                expected: BITSTRING_STATUS_LIST_TYPE,
                found: self.kind.clone(),
            });
        }
        Ok(())
    }
}

/// `credentialStatus` claim pointing a credential at its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitstringStatusListEntry {
    /// Entry identifier (`<list url>#<index>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always [`BITSTRING_STATUS_LIST_ENTRY_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Purpose of the referenced list.
    pub status_purpose: StatusPurpose,

    /// Slot index as a decimal string.
    pub status_list_index: String,

    /// Bits per slot of the referenced list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_size: Option<StatusSize>,

    /// URL of the status list credential.
    pub status_list_credential: String,
}

impl BitstringStatusListEntry {
    /// Parse `statusListIndex`.
    pub fn index(&self) -> Result<u64, VcError> {
        let raw = &self.status_list_index;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VcError::InvalidStatusListIndex(raw.clone()));
        }
        raw.parse()
            .map_err(|_| VcError::InvalidStatusListIndex(raw.clone()))
    }

    /// Fail unless `type` is `BitstringStatusListEntry`.
    pub fn ensure_type(&self) -> Result<(), VcError> {
        if self.kind != BITSTRING_STATUS_LIST_ENTRY_TYPE {
            return Err(VcError::UnexpectedType {
                expected: BITSTRING_STATUS_LIST_ENTRY_TYPE,
                found: self.kind.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_message_hex_has_no_leading_zeros() {
        assert_eq!(StatusMessage::new(0, "a").status, "0x0");
        assert_eq!(StatusMessage::new(10, "a").status, "0xA");
        assert_eq!(StatusMessage::new(255, "a").status, "0xFF");
    }

    #[test]
    fn status_message_code_parses_hex() {
        assert_eq!(StatusMessage::new(171, "x").code(), Some(171));
        let odd = StatusMessage {
            status: "0x0b".to_string(),
            message: "x".to_string(),
        };
        assert_eq!(odd.code(), Some(11));
        let bad = StatusMessage {
            status: "11".to_string(),
            message: "x".to_string(),
        };
        assert_eq!(bad.code(), None);
    }

    #[test]
    fn single_bit_list_omits_size_and_messages() {
        let list = BitstringStatusList {
            id: None,
            kind: BITSTRING_STATUS_LIST_TYPE.to_string(),
            status_purpose: StatusPurpose::Revocation,
            encoded_list: "uH4sI".to_string(),
            ttl: None,
            status_size: None,
            status_messages: None,
        };
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({
                "type": "BitstringStatusList",
                "statusPurpose": "revocation",
                "encodedList": "uH4sI"
            })
        );
        assert_eq!(list.effective_status_size(), StatusSize::One);
    }

    #[test]
    fn entry_serializes_camel_case() {
        let entry = BitstringStatusListEntry {
            id: None,
            kind: BITSTRING_STATUS_LIST_ENTRY_TYPE.to_string(),
            status_purpose: StatusPurpose::Suspension,
            status_list_index: "94567".to_string(),
            status_size: Some(StatusSize::One),
            status_list_credential: "https://issuer.example/status-lists/3".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "type": "BitstringStatusListEntry",
                "statusPurpose": "suspension",
                "statusListIndex": "94567",
                "statusSize": 1,
                "statusListCredential": "https://issuer.example/status-lists/3"
            })
        );
        assert_eq!(entry.index().unwrap(), 94567);
    }

    #[test]
    fn entry_index_rejects_non_decimal() {
        for raw in ["", "-1", "0x10", "1.5", " 7"] {
            let entry = BitstringStatusListEntry {
                id: None,
                kind: BITSTRING_STATUS_LIST_ENTRY_TYPE.to_string(),
                status_purpose: StatusPurpose::Revocation,
                status_list_index: raw.to_string(),
                status_size: None,
                status_list_credential: String::new(),
            };
            assert!(entry.index().is_err(), "{raw:?} accepted");
        }
    }

    #[test]
    fn wrong_subject_type_is_reported() {
        let list: BitstringStatusList = serde_json::from_value(json!({
            "type": "StatusList2021",
            "statusPurpose": "revocation",
            "encodedList": "uH4sI"
        }))
        .unwrap();
        assert!(matches!(
            list.ensure_type(),
            Err(VcError::UnexpectedType { .. })
        ));
    }
}
