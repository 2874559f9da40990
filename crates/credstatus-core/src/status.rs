//! # Status Purposes and Slot Widths
//!
//! A status list is homogeneous: every slot in it has the same
//! [`StatusPurpose`] and the same [`StatusSize`]. Both are fixed when the
//! list is created.
//!
//! Code `0` always means "nothing set" for every purpose. Non-zero codes
//! carry the purpose's "set" meaning; for [`StatusPurpose::Message`] each
//! non-zero code is its own message.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Smallest list capacity accepted. Below this, the share of set slots in a
/// published list lets an observer infer an individual credential's status.
pub const MIN_TOTAL_ENTRIES: u64 = 131_072;

/// What a non-zero status code means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum StatusPurpose {
    /// Permanent cancellation of a credential.
    Revocation,
    /// Temporary hold on a credential.
    Suspension,
    /// A newer version of the credential is available.
    Refresh,
    /// Arbitrary issuer-defined status messages.
    Message,
}

impl StatusPurpose {
    /// All purposes, in declaration order.
    pub const ALL: [StatusPurpose; 4] = [
        StatusPurpose::Revocation,
        StatusPurpose::Suspension,
        StatusPurpose::Refresh,
        StatusPurpose::Message,
    ];

    /// Wire name of the purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revocation => "revocation",
            Self::Suspension => "suspension",
            Self::Refresh => "refresh",
            Self::Message => "message",
        }
    }

    /// Label for code `0`.
    pub fn clear_label(&self) -> &'static str {
        match self {
            Self::Revocation => "not_revoked",
            Self::Suspension => "not_suspended",
            Self::Refresh => "no_refresh_needed",
            Self::Message => "no_message",
        }
    }

    /// Label for a status code under this purpose.
    ///
    /// Code `0` maps to [`clear_label`](Self::clear_label). Every other code
    /// maps to the purpose's "set" label; `message` labels carry the code
    /// (`message_3`).
    pub fn label(&self, code: u8) -> String {
        if code == 0 {
            return self.clear_label().to_string();
        }
        match self {
            Self::Revocation => "revoked".to_string(),
            Self::Suspension => "suspended".to_string(),
            Self::Refresh => "refresh_available".to_string(),
            Self::Message => format!("message_{code}"),
        }
    }
}

impl std::fmt::Display for StatusPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusPurpose {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revocation" => Ok(Self::Revocation),
            "suspension" => Ok(Self::Suspension),
            "refresh" => Ok(Self::Refresh),
            "message" => Ok(Self::Message),
            other => Err(ValidationError::InvalidPurpose(other.to_string())),
        }
    }
}

impl TryFrom<String> for StatusPurpose {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Bits per status slot.
///
/// Restricted to divisors of 8 so a slot never straddles a byte boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u8")]
pub enum StatusSize {
    /// One bit: set / not set.
    #[default]
    One,
    /// Two bits: four codes.
    Two,
    /// Four bits: sixteen codes.
    Four,
    /// Eight bits: 256 codes.
    Eight,
}

impl StatusSize {
    /// Resolve an optional requested width.
    ///
    /// `None` and `Some(0)` both mean "not provided" and resolve to the
    /// default single-bit width. Any other value must be 1, 2, 4 or 8.
    pub fn from_requested(requested: Option<u32>) -> Result<Self, ValidationError> {
        match requested {
            None | Some(0) => Ok(Self::default()),
            Some(bits) => Self::try_from(bits),
        }
    }

    /// Width in bits.
    pub fn bits(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Number of distinct codes a slot can hold (`2^bits`).
    pub fn code_count(&self) -> u16 {
        1u16 << self.bits()
    }

    /// Largest code a slot can hold.
    pub fn max_status(&self) -> u8 {
        u8::MAX >> (8 - self.bits())
    }

    /// Check that `status` fits in a slot of this width.
    pub fn check(&self, status: u32) -> Result<u8, ValidationError> {
        match u8::try_from(status) {
            Ok(code) if code <= self.max_status() => Ok(code),
            _ => Err(ValidationError::StatusOutOfRange {
                status,
                status_size: self.bits(),
            }),
        }
    }
}

impl TryFrom<u32> for StatusSize {
    type Error = ValidationError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(ValidationError::InvalidStatusSize(other)),
        }
    }
}

impl From<StatusSize> for u8 {
    fn from(size: StatusSize) -> Self {
        size.bits()
    }
}

impl std::fmt::Display for StatusSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}
