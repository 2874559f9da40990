//! # Credential Status Facade
//!
//! [`CredentialStatusService`] is what the issuance and verification flows
//! call. Assignment absorbs the races a shared list invites:
//!
//! - a list that filled up between lookup and allocation is replaced by a
//!   fresh list of the same group;
//! - a slot taken by a concurrent allocator is replaced by the list's next
//!   free slot inside the repository, so contention on one list never
//!   costs an attempt;
//! - a credential that already holds an entry for the purpose gets that
//!   entry back, so retrying an assignment whose response was lost never
//!   consumes a second slot.

use std::sync::Arc;

use credstatus_core::{CredentialId, IssuerId, StatusListId, StatusPurpose, StatusSize};
use credstatus_list::{NewStatusEntry, StatusEntry, StatusUpdate, StatusUpdateResult};
use credstatus_store::{StatusListRepository, StoreError};
use credstatus_vc::{
    BitstringStatusListEntry, Issuer, StatusListCredential, BITSTRING_STATUS_LIST_ENTRY_TYPE,
};

use crate::config::StatusConfig;
use crate::error::ServiceError;
use crate::status_list::StatusListService;

/// Upper bound on allocation attempts per assignment. An attempt is only
/// lost when the chosen list fills up before the entry is written.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 32;

/// Issuance- and verification-facing status operations.
#[derive(Debug, Clone)]
pub struct CredentialStatusService {
    lists: StatusListService,
}

impl CredentialStatusService {
    pub fn new(repo: Arc<dyn StatusListRepository>, config: StatusConfig) -> Self {
        Self {
            lists: StatusListService::new(repo, config),
        }
    }

    pub fn from_status_list_service(lists: StatusListService) -> Self {
        Self { lists }
    }

    pub fn status_list_service(&self) -> &StatusListService {
        &self.lists
    }

    /// Give `credential_id` a slot in a list of the (issuer, purpose, size)
    /// group. The new entry has status 0.
    pub async fn assign_status(
        &self,
        credential_id: &CredentialId,
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: Option<u32>,
    ) -> Result<StatusEntry, ServiceError> {
        let status_size = StatusSize::from_requested(status_size)?;
        if let Some(existing) = self.lists.get_status_entry(credential_id, purpose).await? {
            return Ok(existing);
        }

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let list = self
                .lists
                .find_or_create_status_list(issuer_id, purpose, status_size)
                .await?;
            let (list_id, index) = match self.lists.get_next_available_index(list.id()).await? {
                Some(index) => (list.id(), index),
                None => {
                    let fresh = self
                        .lists
                        .create_status_list(StatusListService::group_params(
                            issuer_id,
                            purpose,
                            status_size,
                        ))
                        .await?;
                    match self.lists.get_next_available_index(fresh.id()).await? {
                        Some(index) => (fresh.id(), index),
                        None => continue,
                    }
                }
            };

            let params = NewStatusEntry {
                credential_id: credential_id.clone(),
                status_list_id: list_id,
                status_list_index: index,
                status_size,
                purpose,
            };
            match self.lists.create_status_entry(params).await {
                Ok(entry) => {
                    tracing::info!(
                        credential_id = %credential_id,
                        status_list_id = %entry.status_list_id,
                        index = entry.status_list_index,
                        purpose = %purpose,
                        "status assigned"
                    );
                    return Ok(entry);
                }
                Err(ServiceError::Store(e)) if e.is_allocation_race() => {
                    tracing::warn!(
                        credential_id = %credential_id,
                        status_list_id = %list_id,
                        index,
                        attempt,
                        "status list filled concurrently, retrying"
                    );
                }
                Err(ServiceError::Store(StoreError::DuplicateEntry { .. })) => {
                    if let Some(existing) =
                        self.lists.get_status_entry(credential_id, purpose).await?
                    {
                        return Ok(existing);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(ServiceError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// The `credentialStatus` claim for `entry`, ready to embed in the
    /// credential before it is signed.
    pub fn create_bitstring_status_list_entry(&self, entry: &StatusEntry) -> BitstringStatusListEntry {
        let list_url = self.lists.config().status_list_url(entry.status_list_id);
        BitstringStatusListEntry {
            id: Some(format!("{list_url}#{}", entry.status_list_index)),
            kind: BITSTRING_STATUS_LIST_ENTRY_TYPE.to_string(),
            status_purpose: entry.purpose,
            status_list_index: entry.status_list_index.to_string(),
            status_size: Some(entry.status_size),
            status_list_credential: list_url,
        }
    }

    /// Change a credential's status. Failures are reported in the result.
    pub async fn update_status(
        &self,
        credential_id: &CredentialId,
        status: u32,
        purpose: StatusPurpose,
        reason: Option<String>,
    ) -> StatusUpdateResult {
        self.lists
            .update_credential_status(StatusUpdate {
                credential_id: credential_id.clone(),
                status,
                purpose,
                reason,
            })
            .await
    }

    pub async fn get_status(
        &self,
        credential_id: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusEntry>, ServiceError> {
        self.lists.get_status_entry(credential_id, purpose).await
    }

    /// The unsigned status list credential for `status_list_id`, or `None`
    /// if no such list exists.
    pub async fn status_list_credential(
        &self,
        status_list_id: StatusListId,
        issuer: impl Into<Issuer>,
    ) -> Result<Option<StatusListCredential>, ServiceError> {
        let Some(list) = self.lists.get_status_list(status_list_id).await? else {
            return Ok(None);
        };
        let url = self.lists.config().status_list_url(status_list_id);
        Ok(Some(list.render_status_list_credential(issuer, &url)))
    }
}
