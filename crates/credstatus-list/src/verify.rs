//! # Verifier-Side Status Check
//!
//! [`check_status`] answers "what is the status of this credential" from a
//! `credentialStatus` claim and the status list credential it points at,
//! following the Bitstring Status List validation algorithm. Fetching the
//! list document and checking its proof are the caller's job.
//!
//! Each error maps to one of the processing error names of the status list
//! data model through [`StatusVerificationError::processing_error`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use credstatus_codec::{decode, read_status, CodecError};
use credstatus_core::{StatusPurpose, StatusSize, MIN_TOTAL_ENTRIES};
use credstatus_vc::{
    BitstringStatusListEntry, StatusListCredential, VcError,
    BITSTRING_STATUS_LIST_CREDENTIAL_TYPE,
};

/// Why a status could not be determined.
#[derive(Error, Debug)]
pub enum StatusVerificationError {
    /// A claim or the list document is malformed.
    #[error("malformed status document: {0}")]
    Document(#[from] VcError),

    /// The fetched document is not a `BitstringStatusListCredential`.
    #[error("document is not a BitstringStatusListCredential")]
    NotAStatusListCredential,

    /// The entry points at a list with another purpose.
    #[error("status purpose mismatch: entry is {entry}, list is {list}")]
    PurposeMismatch {
        entry: StatusPurpose,
        list: StatusPurpose,
    },

    /// The entry and the list disagree about the slot width.
    #[error("status size mismatch: entry has {entry} bits, list has {list}")]
    StatusSizeMismatch { entry: StatusSize, list: StatusSize },

    /// The list document is not yet valid at the check time.
    #[error("status list is not valid before {valid_from}")]
    NotYetValid { valid_from: DateTime<Utc> },

    /// The list document is past its `validUntil`.
    #[error("status list expired at {valid_until}")]
    Expired { valid_until: DateTime<Utc> },

    /// `encodedList` does not decode.
    #[error("encodedList is malformed: {0}")]
    Decode(#[from] CodecError),

    /// The decoded bitstring is shorter than the privacy minimum.
    #[error("status list holds {bits} bits, at least {required} required")]
    ListTooShort { bits: u64, required: u64 },

    /// The index lies beyond the end of the bitstring.
    #[error("statusListIndex {index} is outside a list of {capacity} entries")]
    IndexOutOfRange { index: u64, capacity: u64 },
}

impl StatusVerificationError {
    /// Processing error name for this failure.
    pub fn processing_error(&self) -> &'static str {
        match self {
            Self::Decode(_) => "MALFORMED_VALUE_ERROR",
            Self::ListTooShort { .. } => "STATUS_LIST_LENGTH_ERROR",
            Self::IndexOutOfRange { .. } => "RANGE_ERROR",
            _ => "STATUS_VERIFICATION_ERROR",
        }
    }
}

/// Result of a successful status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    /// Purpose of the checked entry.
    pub purpose: StatusPurpose,
    /// Slot that was read.
    pub index: u64,
    /// Code stored at the slot.
    pub status: u8,
    /// Message for `status`, from the list's `statusMessages` when present.
    pub message: String,
}

impl StatusCheck {
    /// Whether any non-zero status is set (revoked, suspended, ...).
    pub fn is_set(&self) -> bool {
        self.status != 0
    }
}

/// Resolve the status a `credentialStatus` claim points at.
pub fn check_status(
    entry: &BitstringStatusListEntry,
    credential: &StatusListCredential,
    now: DateTime<Utc>,
) -> Result<StatusCheck, StatusVerificationError> {
    entry.ensure_type()?;
    if !credential.credential_type.contains_vc_type()
        || !credential
            .credential_type
            .contains(BITSTRING_STATUS_LIST_CREDENTIAL_TYPE)
    {
        return Err(StatusVerificationError::NotAStatusListCredential);
    }
    let subject = &credential.credential_subject;
    subject.ensure_type()?;

    if let Some(valid_from) = credential.valid_from {
        if now < valid_from {
            return Err(StatusVerificationError::NotYetValid { valid_from });
        }
    }
    if let Some(valid_until) = credential.valid_until.filter(|_| credential.is_expired_at(now)) {
        return Err(StatusVerificationError::Expired { valid_until });
    }

    if entry.status_purpose != subject.status_purpose {
        return Err(StatusVerificationError::PurposeMismatch {
            entry: entry.status_purpose,
            list: subject.status_purpose,
        });
    }
    let size = subject.effective_status_size();
    let entry_size = entry.status_size.unwrap_or_default();
    if entry_size != size {
        return Err(StatusVerificationError::StatusSizeMismatch {
            entry: entry_size,
            list: size,
        });
    }

    let buffer = decode(&subject.encoded_list)?;
    let bits = (buffer.len() as u64).saturating_mul(8);
    let width = u64::from(size.bits());
    let required = MIN_TOTAL_ENTRIES * width;
    if bits < required {
        return Err(StatusVerificationError::ListTooShort { bits, required });
    }

    let index = entry.index()?;
    let capacity = bits / width;
    if index >= capacity {
        return Err(StatusVerificationError::IndexOutOfRange { index, capacity });
    }
    let status = read_status(&buffer, index, size)?;

    let message = subject
        .status_messages
        .as_deref()
        .and_then(|messages| messages.iter().find(|m| m.code() == Some(status)))
        .map(|m| m.message.clone())
        .unwrap_or_else(|| subject.status_purpose.label(status));

    Ok(StatusCheck {
        purpose: subject.status_purpose,
        index,
        status,
        message,
    })
}
