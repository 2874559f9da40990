//! Errors raised by status list operations.

use thiserror::Error;

use credstatus_codec::CodecError;
use credstatus_core::{StatusListId, ValidationError};

/// Failure creating, reading or mutating a status list.
#[derive(Error, Debug)]
pub enum StatusListError {
    /// A parameter or requested value violated an invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The stored bitstring could not be decoded or re-encoded.
    #[error("bitstring codec error: {0}")]
    Codec(#[from] CodecError),

    /// An entry was applied to a list it does not belong to.
    #[error("status entry belongs to list {expected}, not {actual}")]
    ListMismatch {
        /// List recorded on the entry.
        expected: StatusListId,
        /// List the update was applied to.
        actual: StatusListId,
    },
}
