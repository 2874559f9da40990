//! # In-Memory Repository
//!
//! All tables sit behind one `parking_lot::RwLock`. Every operation takes
//! the guard once, does its work synchronously and drops it before
//! returning, so no lock is held across an `.await` and each two-record
//! mutation is atomic with respect to every other operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use credstatus_core::{
    CredentialId, IssuerId, StatusEntryId, StatusListId, StatusPurpose, StatusSize,
};
use credstatus_list::{
    CreateStatusListParams, NewStatusEntry, StatusEntry, StatusList, StatusListRecord,
    StatusUpdate, StatusUpdateResult,
};

use crate::error::StoreError;
use crate::repository::{check_allocation, StatusListRepository};

#[derive(Debug, Default)]
struct Tables {
    lists: HashMap<StatusListId, StatusListRecord>,
    entries: HashMap<StatusEntryId, StatusEntry>,
    by_credential: HashMap<(CredentialId, StatusPurpose), StatusEntryId>,
}

/// Process-local [`StatusListRepository`]. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusListRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStatusListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored lists.
    pub fn list_count(&self) -> usize {
        self.tables.read().lists.len()
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.tables.read().entries.len()
    }

    fn apply_update(tables: &mut Tables, update: &StatusUpdate) -> Result<StatusUpdateResult, StoreError> {
        let key = (update.credential_id.clone(), update.purpose);
        let Some(entry_id) = tables.by_credential.get(&key).copied() else {
            return Ok(StatusUpdateResult::entry_not_found(
                &update.credential_id,
                update.purpose,
            ));
        };
        let Some(mut entry) = tables.entries.get(&entry_id).cloned() else {
            return Ok(StatusUpdateResult::entry_not_found(
                &update.credential_id,
                update.purpose,
            ));
        };
        let Some(record) = tables.lists.get(&entry.status_list_id).cloned() else {
            return Ok(StatusUpdateResult::list_not_found(entry.status_list_id));
        };

        let mut list = StatusList::from_persisted(record);
        entry.apply_status(&mut list, update.status)?;

        tables.lists.insert(list.id(), list.into_record());
        tables.entries.insert(entry.id, entry.clone());
        Ok(StatusUpdateResult::updated(entry))
    }
}

#[async_trait]
impl StatusListRepository for InMemoryStatusListRepository {
    async fn create_status_list(
        &self,
        params: CreateStatusListParams,
    ) -> Result<StatusList, StoreError> {
        let list = StatusList::create(params)?;
        self.tables
            .write()
            .lists
            .insert(list.id(), list.record().clone());
        Ok(list)
    }

    async fn find_by_id(&self, id: StatusListId) -> Result<Option<StatusList>, StoreError> {
        Ok(self
            .tables
            .read()
            .lists
            .get(&id)
            .cloned()
            .map(StatusList::from_persisted))
    }

    async fn find_available_status_list(
        &self,
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Option<StatusList>, StoreError> {
        let tables = self.tables.read();
        let found = tables
            .lists
            .values()
            .filter(|r| {
                &r.issuer_id == issuer_id
                    && r.purpose == purpose
                    && r.status_size == status_size
                    && r.used_entries < r.total_entries
            })
            .min_by_key(|r| (r.created_at, *r.id.as_uuid()))
            .cloned();
        Ok(found.map(StatusList::from_persisted))
    }

    async fn update(&self, list: &StatusList) -> Result<StatusList, StoreError> {
        let mut tables = self.tables.write();
        let stored = tables
            .lists
            .get_mut(&list.id())
            .ok_or(StoreError::StatusListNotFound(list.id()))?;
        stored.ttl = list.ttl();
        stored.metadata = list.metadata().cloned();
        stored.updated_at = list.updated_at();
        Ok(StatusList::from_persisted(stored.clone()))
    }

    async fn create_status_entry(&self, mut params: NewStatusEntry) -> Result<StatusEntry, StoreError> {
        let mut tables = self.tables.write();
        let record = tables
            .lists
            .get(&params.status_list_id)
            .cloned()
            .ok_or(StoreError::StatusListNotFound(params.status_list_id))?;
        let mut list = StatusList::from_persisted(record);
        check_allocation(&list, &params)?;

        let key = (params.credential_id.clone(), params.purpose);
        if tables.by_credential.contains_key(&key) {
            return Err(StoreError::DuplicateEntry {
                credential_id: params.credential_id,
                purpose: params.purpose,
            });
        }

        let index = list
            .increment_used_entries()
            .ok_or(StoreError::ListFull(list.id()))?;
        tracing::debug!(
            status_list_id = %list.id(),
            requested = params.status_list_index,
            index,
            "allocated status slot"
        );
        params.status_list_index = index;

        let entry = StatusEntry::new(params);
        tables.lists.insert(list.id(), list.into_record());
        tables.by_credential.insert(key, entry.id);
        tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_status_entry(
        &self,
        credential_id: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusEntry>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .by_credential
            .get(&(credential_id.clone(), purpose))
            .and_then(|id| tables.entries.get(id))
            .cloned())
    }

    async fn update_credential_status(&self, update: StatusUpdate) -> StatusUpdateResult {
        let mut tables = self.tables.write();
        Self::apply_update(&mut tables, &update).unwrap_or_else(|e| {
            tracing::warn!(
                credential_id = %update.credential_id,
                purpose = %update.purpose,
                error = %e,
                "status update rejected"
            );
            StatusUpdateResult::failed(e.to_string())
        })
    }
}
