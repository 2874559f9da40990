//! # Validation Errors
//!
//! Caller errors detected before any I/O takes place. These are never
//! retried without correcting the input, so the messages are written for
//! the operator who has to fix the request: the endpoint layer returns them
//! verbatim in 400 responses.

use thiserror::Error;

/// A request parameter violated a status list invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The issuer identifier was empty.
    #[error("issuerId is required")]
    MissingIssuer,

    /// The credential identifier was empty.
    #[error("credentialId is required")]
    MissingCredential,

    /// The purpose is not one of `revocation`, `suspension`, `refresh`, `message`.
    #[error("Invalid status purpose: {0}")]
    InvalidPurpose(String),

    /// The status width is not one of 1, 2, 4 or 8 bits.
    #[error("statusSize must be between 1 and 8 bits")]
    InvalidStatusSize(u32),

    /// The list is smaller than the privacy minimum.
    #[error("totalEntries must be at least 131,072 for privacy")]
    TotalEntriesBelowMinimum(u64),

    /// The list is larger than the engine will hold in memory.
    #[error("totalEntries must be at most {max}, got {requested}")]
    TotalEntriesAboveMaximum {
        /// Requested capacity.
        requested: u64,
        /// Largest accepted capacity.
        max: u64,
    },

    /// A negative TTL was supplied.
    #[error("ttl must be non-negative")]
    NegativeTtl(i64),

    /// The TTL would put `validUntil` past any representable instant.
    #[error("ttl must be at most {max} ms, got {requested}")]
    TtlTooLarge {
        /// Requested TTL in milliseconds.
        requested: i64,
        /// Longest accepted TTL in milliseconds.
        max: u64,
    },

    /// A status code does not fit in the slot width of its list.
    #[error("status {status} does not fit in a {status_size}-bit status slot")]
    StatusOutOfRange {
        /// Requested status code.
        status: u32,
        /// Width of the slot in bits.
        status_size: u8,
    },

    /// An index lies outside the list capacity.
    #[error("statusListIndex {index} is outside a list of {total_entries} entries")]
    IndexOutOfRange {
        /// Requested slot index.
        index: u64,
        /// Capacity of the list.
        total_entries: u64,
    },
}
