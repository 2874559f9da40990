//! # credstatus-list — Status List Entity
//!
//! A [`StatusList`] owns one compressed bitstring shared by up to
//! `totalEntries` credentials of the same issuer, purpose and slot width.
//! A [`StatusEntry`] maps one credential to one slot.
//!
//! ## Invariants
//!
//! - `usedEntries <= totalEntries`, and `usedEntries` only grows: a slot is
//!   never handed out twice, even after its credential is deleted.
//! - An entry's `currentStatus` equals the code stored at its slot. The only
//!   code path that changes either is [`StatusEntry::apply_status`], which
//!   changes both.
//! - Validation happens at creation only; records rehydrated with
//!   [`StatusList::from_persisted`] are trusted.
//!
//! The [`verify`] module is the consuming side: it checks a credential's
//! `credentialStatus` claim against a fetched status list credential.

pub mod entry;
pub mod error;
pub mod list;
pub mod verify;

pub use entry::{NewStatusEntry, StatusEntry, StatusUpdate, StatusUpdateResult};
pub use error::StatusListError;
pub use list::{
    validate_params, CreateStatusListParams, StatusList, StatusListRecord, ValidatedParams,
    DEFAULT_TOTAL_ENTRIES, MAX_TOTAL_ENTRIES, MAX_TTL_MS,
};
pub use verify::{check_status, StatusCheck, StatusVerificationError};
