//! # Status Entries
//!
//! A [`StatusEntry`] maps one credential to one slot of one list. Its
//! `statusSize` and `purpose` are copies of the owning list's, kept so a
//! status read needs no join.

use serde::{Deserialize, Serialize};

use credstatus_core::{
    CredentialId, StatusEntryId, StatusListId, StatusPurpose, StatusSize, Timestamp,
};

use crate::error::StatusListError;
use crate::list::StatusList;

/// Request to record a newly allocated slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatusEntry {
    /// Credential the slot is issued to.
    pub credential_id: CredentialId,
    /// List the slot belongs to.
    pub status_list_id: StatusListId,
    /// Requested slot. The repository may move a stale index up to the
    /// list's next free slot.
    pub status_list_index: u64,
    /// Width of the slot. Must match the list's.
    pub status_size: StatusSize,
    /// Must match the list's purpose.
    pub purpose: StatusPurpose,
}

/// A credential's slot and its current status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    /// Unique identifier of the entry.
    pub id: StatusEntryId,
    /// Credential holding the slot. One entry per credential and purpose.
    pub credential_id: CredentialId,
    /// Owning status list.
    pub status_list_id: StatusListId,
    /// Slot within the owning list. Never reused.
    pub status_list_index: u64,
    /// Width of the slot in bits, equal to the owning list's.
    pub status_size: StatusSize,
    /// Purpose shared with the owning list.
    pub purpose: StatusPurpose,
    /// Code last written to the slot. Always matches the list's bitstring.
    pub current_status: u8,
    /// When the slot was allocated.
    pub created_at: Timestamp,
    /// When `current_status` last changed.
    pub updated_at: Timestamp,
}

impl StatusEntry {
    /// A fresh entry with status 0.
    pub fn new(params: NewStatusEntry) -> Self {
        let now = Timestamp::now();
        Self {
            id: StatusEntryId::new(),
            credential_id: params.credential_id,
            status_list_id: params.status_list_id,
            status_list_index: params.status_list_index,
            status_size: params.status_size,
            purpose: params.purpose,
            current_status: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Label of the current code under the entry's purpose.
    pub fn status_label(&self) -> String {
        self.purpose.label(self.current_status)
    }

    /// Write `status` into this entry's slot of `list` and record it here.
    ///
    /// Either both records change or neither does. Repositories call this
    /// inside their atomic unit with the latest persisted copy of `list`.
    pub fn apply_status(
        &mut self,
        list: &mut StatusList,
        status: u32,
    ) -> Result<u8, StatusListError> {
        if self.status_list_id != list.id() {
            return Err(StatusListError::ListMismatch {
                expected: self.status_list_id,
                actual: list.id(),
            });
        }
        let code = list.set_status(self.status_list_index, status)?;
        self.current_status = code;
        self.updated_at = list.updated_at();
        Ok(code)
    }
}

/// Request to change a credential's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// Credential whose status changes.
    pub credential_id: CredentialId,
    /// New code. Must fit the entry's slot width.
    pub status: u32,
    /// Selects the entry when a credential holds several.
    pub purpose: StatusPurpose,
    /// Operator-supplied reason, logged but not stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

const NOT_FOUND: &str = "not found";

/// Outcome of a status change. Failures are reported here, not as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResult {
    /// Whether the entry and its list were both written.
    pub success: bool,
    /// The entry as stored after the change. Set only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_entry: Option<StatusEntry>,
    /// Why the change was refused. Contains `not found` for missing records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusUpdateResult {
    /// A successful change that left `entry` stored.
    pub fn updated(entry: StatusEntry) -> Self {
        Self {
            success: true,
            status_entry: Some(entry),
            error: None,
        }
    }

    /// A refused change.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_entry: None,
            error: Some(error.into()),
        }
    }

    /// Failure because the credential has no entry for the purpose.
    pub fn entry_not_found(credential_id: &CredentialId, purpose: StatusPurpose) -> Self {
        Self::failed(format!(
            "Status entry not found for credential {credential_id} ({purpose})"
        ))
    }

    /// Failure because the entry's owning list is gone.
    pub fn list_not_found(status_list_id: StatusListId) -> Self {
        Self::failed(format!("Status list not found: {status_list_id}"))
    }

    /// Whether the failure was a missing record (a 404 at the endpoint).
    pub fn is_not_found(&self) -> bool {
        !self.success
            && self
                .error
                .as_deref()
                .is_some_and(|e| e.contains(NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::CreateStatusListParams;
    use credstatus_core::IssuerId;

    fn list(size: u32) -> StatusList {
        StatusList::create(
            CreateStatusListParams::new(
                IssuerId::new("did:web:issuer.example").unwrap(),
                StatusPurpose::Message,
            )
            .with_status_size(size),
        )
        .unwrap()
    }

    fn entry_for(list: &StatusList, index: u64) -> StatusEntry {
        StatusEntry::new(NewStatusEntry {
            credential_id: CredentialId::new(format!("urn:uuid:cred-{index}")).unwrap(),
            status_list_id: list.id(),
            status_list_index: index,
            status_size: list.status_size(),
            purpose: list.purpose(),
        })
    }

    #[test]
    fn new_entry_starts_clear() {
        let list = list(1);
        let entry = entry_for(&list, 3);
        assert_eq!(entry.current_status, 0);
        assert_eq!(entry.status_label(), "no_message");
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn apply_status_keeps_entry_and_bitstring_in_step() {
        let mut list = list(4);
        let mut entry = entry_for(&list, 12);
        assert_eq!(entry.apply_status(&mut list, 9).unwrap(), 9);
        assert_eq!(entry.current_status, 9);
        assert_eq!(entry.status_label(), "message_9");
        assert_eq!(list.status_at(12).unwrap(), 9);
    }

    #[test]
    fn failed_apply_changes_nothing() {
        let mut list = list(2);
        let mut entry = entry_for(&list, 0);
        let before = list.clone();
        assert!(entry.apply_status(&mut list, 4).is_err());
        assert_eq!(entry.current_status, 0);
        assert_eq!(list, before);
    }

    #[test]
    fn apply_to_foreign_list_is_rejected() {
        let mut other = list(1);
        let mut entry = entry_for(&list(1), 0);
        assert!(matches!(
            entry.apply_status(&mut other, 1),
            Err(StatusListError::ListMismatch { .. })
        ));
    }

    #[test]
    fn not_found_results_say_so() {
        let id = CredentialId::new("urn:uuid:missing").unwrap();
        let result = StatusUpdateResult::entry_not_found(&id, StatusPurpose::Revocation);
        assert!(!result.success);
        assert!(result.is_not_found());
        assert!(result.error.as_deref().unwrap().contains("not found"));

        let other = StatusUpdateResult::failed("storage unavailable");
        assert!(!other.is_not_found());
    }

    #[test]
    fn result_serializes_sparse() {
        let result = StatusUpdateResult::list_not_found(StatusListId::new());
        let doc = serde_json::to_value(&result).unwrap();
        assert_eq!(doc["success"], false);
        assert!(doc.get("statusEntry").is_none());
        assert!(doc["error"].as_str().unwrap().starts_with("Status list not found"));
    }
}
