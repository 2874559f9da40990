//! Service errors.

use thiserror::Error;

use credstatus_core::{StatusListId, ValidationError};
use credstatus_list::StatusListError;
use credstatus_store::StoreError;

/// Failure of a status list service operation.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad input; never retried without correcting it.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A status list requested by id does not exist.
    #[error("Status list not found: {0}")]
    StatusListNotFound(StatusListId),

    /// Every allocation attempt found its list filled by concurrent
    /// allocators.
    #[error("no status slot could be allocated after {attempts} attempts")]
    AllocationExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// A list or entry rejected the change.
    #[error(transparent)]
    StatusList(#[from] StatusListError),

    /// The repository failed.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StatusListNotFound(id) => Self::StatusListNotFound(id),
            StoreError::StatusList(StatusListError::Validation(e)) => Self::Validation(e),
            other => Self::Store(other),
        }
    }
}

impl ServiceError {
    /// Whether the error names a missing record (a 404 at the endpoint).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StatusListNotFound(_))
    }

    /// Whether the error is a caller error (a 400 at the endpoint).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::StatusList(StatusListError::Validation(_))
        )
    }
}
