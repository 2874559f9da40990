//! Storage errors.

use thiserror::Error;

use credstatus_core::{CredentialId, StatusListId, StatusPurpose};
use credstatus_list::StatusListError;

/// Failure of a repository operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No list with this id is stored.
    #[error("Status list not found: {0}")]
    StatusListNotFound(StatusListId),

    /// A credential already holds an entry for this purpose.
    #[error("status entry already exists for credential {credential_id} ({purpose})")]
    DuplicateEntry {
        /// Credential that already holds an entry.
        credential_id: CredentialId,
        /// Purpose of the existing entry.
        purpose: StatusPurpose,
    },

    /// The requested slot lies past the next free slot.
    #[error("index {requested} is past the next free slot of status list {status_list_id}")]
    IndexConflict {
        /// List the slot was requested from.
        status_list_id: StatusListId,
        /// Requested slot index.
        requested: u64,
    },

    /// The list has no free slot left.
    #[error("status list {0} has no remaining capacity")]
    ListFull(StatusListId),

    /// The entry's purpose or width differs from its list's.
    #[error("status entry does not match purpose or statusSize of list {0}")]
    IncompatibleEntry(StatusListId),

    /// The list or entry rejected the change.
    #[error(transparent)]
    StatusList(#[from] StatusListError),

    /// The database driver failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value does not fit its BIGINT column.
    #[error("{0} does not fit in a BIGINT column")]
    ColumnOverflow(u64),

    /// A stored row could not be mapped back to a record.
    #[error("corrupt {table} row {id}: {reason}")]
    Corrupt {
        /// Table the row came from.
        table: &'static str,
        /// Primary key of the row.
        id: String,
        /// What could not be mapped.
        reason: String,
    },
}

impl StoreError {
    /// Whether re-resolving the list and index may succeed.
    pub fn is_allocation_race(&self) -> bool {
        matches!(self, Self::IndexConflict { .. } | Self::ListFull(_))
    }
}
