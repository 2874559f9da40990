//! The storage contract.

use async_trait::async_trait;

use credstatus_core::{CredentialId, IssuerId, StatusListId, StatusPurpose, StatusSize};
use credstatus_list::{
    CreateStatusListParams, NewStatusEntry, StatusEntry, StatusList, StatusUpdate,
    StatusUpdateResult,
};

use crate::error::StoreError;

/// Durable storage for status lists and status entries.
///
/// Implementations are shared across request tasks as
/// `Arc<dyn StatusListRepository>`.
#[async_trait]
pub trait StatusListRepository: Send + Sync {
    /// Validate `params`, build the list and persist it.
    async fn create_status_list(
        &self,
        params: CreateStatusListParams,
    ) -> Result<StatusList, StoreError>;

    async fn find_by_id(&self, id: StatusListId) -> Result<Option<StatusList>, StoreError>;

    /// Oldest list of the group that still has a free slot.
    async fn find_available_status_list(
        &self,
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Option<StatusList>, StoreError>;

    /// Persist `ttl`, `metadata` and `updatedAt` of `list`.
    async fn update(&self, list: &StatusList) -> Result<StatusList, StoreError>;

    /// Record `params` and consume the list's next free slot in one unit.
    ///
    /// The entry receives the list's `usedEntries` as read under the
    /// allocation lock. A requested index below it was taken by another
    /// allocator and is moved up to the next free slot; one above it would
    /// leave a gap and fails with [`StoreError::IndexConflict`].
    async fn create_status_entry(&self, params: NewStatusEntry) -> Result<StatusEntry, StoreError>;

    async fn find_status_entry(
        &self,
        credential_id: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusEntry>, StoreError>;

    /// Change a credential's status and its list's bitstring together.
    ///
    /// Every failure, including missing records, is reported in the
    /// result.
    async fn update_credential_status(&self, update: StatusUpdate) -> StatusUpdateResult;
}

/// Checks shared by the backends before consuming a slot.
pub(crate) fn check_allocation(list: &StatusList, params: &NewStatusEntry) -> Result<(), StoreError> {
    if list.purpose() != params.purpose || list.status_size() != params.status_size {
        return Err(StoreError::IncompatibleEntry(list.id()));
    }
    if !list.has_capacity() {
        return Err(StoreError::ListFull(list.id()));
    }
    if params.status_list_index > list.used_entries() {
        return Err(StoreError::IndexConflict {
            status_list_id: list.id(),
            requested: params.status_list_index,
        });
    }
    Ok(())
}
