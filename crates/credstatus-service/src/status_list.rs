//! # Status List Service
//!
//! Group-level allocation policy. A group is every list sharing an
//! issuer, a purpose and a slot width; [`StatusListService::find_or_create_status_list`]
//! is the only place that decides which list of a group a new slot goes
//! into.
//!
//! Two allocators that both find a group full may each create a list.
//! That leaves one list partly unused but never hands out a slot twice.

use std::sync::Arc;

use serde_json::{Map, Value};

use credstatus_core::{CredentialId, IssuerId, StatusListId, StatusPurpose, StatusSize};
use credstatus_list::{
    validate_params, CreateStatusListParams, NewStatusEntry, StatusEntry, StatusList,
    StatusUpdate, StatusUpdateResult,
};
use credstatus_store::StatusListRepository;

use crate::config::StatusConfig;
use crate::error::ServiceError;

/// Allocation and mutation of status lists over a repository.
#[derive(Clone)]
pub struct StatusListService {
    repo: Arc<dyn StatusListRepository>,
    config: StatusConfig,
}

impl std::fmt::Debug for StatusListService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusListService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StatusListService {
    pub fn new(repo: Arc<dyn StatusListRepository>, config: StatusConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Validate and persist a new list.
    ///
    /// Unset capacity and TTL take the configured defaults.
    pub async fn create_status_list(
        &self,
        mut params: CreateStatusListParams,
    ) -> Result<StatusList, ServiceError> {
        if params.total_entries.is_none() {
            params.total_entries = Some(self.config.default_total_entries);
        }
        if params.ttl.is_none() {
            params.ttl = self.config.default_ttl_ms;
        }
        validate_params(&params)?;

        let list = self.repo.create_status_list(params).await?;
        tracing::info!(
            status_list_id = %list.id(),
            issuer_id = %list.issuer_id(),
            purpose = %list.purpose(),
            status_size = list.status_size().bits(),
            total_entries = list.total_entries(),
            "status list created"
        );
        Ok(list)
    }

    /// A list of the group with a free slot, creating one if none exists.
    pub async fn find_or_create_status_list(
        &self,
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<StatusList, ServiceError> {
        if let Some(list) = self
            .repo
            .find_available_status_list(issuer_id, purpose, status_size)
            .await?
        {
            return Ok(list);
        }
        self.create_status_list(Self::group_params(issuer_id, purpose, status_size))
            .await
    }

    /// The slot the next allocation on `status_list_id` would receive, or
    /// `None` when the list is full. Nothing is consumed.
    pub async fn get_next_available_index(
        &self,
        status_list_id: StatusListId,
    ) -> Result<Option<u64>, ServiceError> {
        let list = self
            .repo
            .find_by_id(status_list_id)
            .await?
            .ok_or(ServiceError::StatusListNotFound(status_list_id))?;
        Ok(list.has_capacity().then(|| list.used_entries()))
    }

    /// Persist an entry and consume its slot as one unit.
    pub async fn create_status_entry(
        &self,
        params: NewStatusEntry,
    ) -> Result<StatusEntry, ServiceError> {
        let entry = self.repo.create_status_entry(params).await?;
        tracing::debug!(
            status_list_id = %entry.status_list_id,
            index = entry.status_list_index,
            credential_id = %entry.credential_id,
            "status entry created"
        );
        Ok(entry)
    }

    /// Change a credential's status. The repository's result is returned
    /// unchanged.
    pub async fn update_credential_status(&self, update: StatusUpdate) -> StatusUpdateResult {
        let credential_id = update.credential_id.clone();
        let purpose = update.purpose;
        let reason = update.reason.clone();
        let result = self.repo.update_credential_status(update).await;
        if let Some(entry) = result.status_entry.as_ref().filter(|_| result.success) {
            tracing::info!(
                credential_id = %credential_id,
                purpose = %purpose,
                status = entry.current_status,
                reason = reason.as_deref().unwrap_or(""),
                "credential status changed"
            );
        }
        result
    }

    pub async fn get_status_entry(
        &self,
        credential_id: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusEntry>, ServiceError> {
        Ok(self.repo.find_status_entry(credential_id, purpose).await?)
    }

    pub async fn get_status_list(
        &self,
        status_list_id: StatusListId,
    ) -> Result<Option<StatusList>, ServiceError> {
        Ok(self.repo.find_by_id(status_list_id).await?)
    }

    /// Change a list's TTL and metadata. The bitstring and capacity are
    /// untouched.
    pub async fn update_status_list_settings(
        &self,
        status_list_id: StatusListId,
        ttl: Option<i64>,
        metadata: Option<Map<String, Value>>,
    ) -> Result<StatusList, ServiceError> {
        let mut list = self
            .repo
            .find_by_id(status_list_id)
            .await?
            .ok_or(ServiceError::StatusListNotFound(status_list_id))?;
        list.set_ttl(ttl)?;
        list.set_metadata(metadata);
        Ok(self.repo.update(&list).await?)
    }

    pub(crate) fn group_params(
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> CreateStatusListParams {
        CreateStatusListParams::new(issuer_id.clone(), purpose)
            .with_status_size(u32::from(status_size.bits()))
    }
}
