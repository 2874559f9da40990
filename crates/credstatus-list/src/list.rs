//! # Status List Entity
//!
//! [`StatusList`] wraps a [`StatusListRecord`], the persisted shape, and
//! only exposes mutations that keep it consistent: capacity can only grow
//! one slot at a time, and the bitstring is only rewritten through
//! [`StatusList::set_status`] or [`StatusList::update_encoded_list`].
//!
//! Creation is the only point where parameters are validated. Records read
//! back from storage went through [`StatusList::create`] when they were
//! first written.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use credstatus_codec::{decode, encode, read_status, write_status, zeroed};
use credstatus_core::{
    IssuerId, StatusListId, StatusPurpose, StatusSize, Timestamp, ValidationError,
    MIN_TOTAL_ENTRIES,
};
use credstatus_vc::{
    BitstringStatusList, ContextValue, CredentialTypeValue, Issuer, StatusListCredential,
    StatusMessage, BITSTRING_STATUS_LIST_CREDENTIAL_TYPE, BITSTRING_STATUS_LIST_TYPE,
    VERIFIABLE_CREDENTIAL_TYPE,
};

use crate::error::StatusListError;

/// Capacity used when a request does not name one.
pub const DEFAULT_TOTAL_ENTRIES: u64 = MIN_TOTAL_ENTRIES;

/// Largest capacity accepted. At 8 bits per slot this is a 16 MiB
/// bitstring, which still decodes under the codec's inflation limit.
pub const MAX_TOTAL_ENTRIES: u64 = 1 << 24;

/// Longest accepted TTL: 100 years of 365 days, in milliseconds. Every
/// list created before year 262000 can render `validUntil` with it.
pub const MAX_TTL_MS: u64 = 100 * 365 * 86_400_000;

/// Request to create a status list.
///
/// `status_size`, `total_entries` and `ttl` keep the loose types callers
/// send so that [`validate_params`] can report the documented messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStatusListParams {
    /// Issuer that signs the published list.
    pub issuer_id: IssuerId,
    /// Meaning of a non-zero code.
    pub purpose: StatusPurpose,
    /// Bits per slot. `None` or `0` means one bit.
    #[serde(default)]
    pub status_size: Option<u32>,
    /// Slot capacity, at least 131,072.
    #[serde(default)]
    pub total_entries: Option<u64>,
    /// Milliseconds the rendered document stays valid.
    #[serde(default)]
    pub ttl: Option<i64>,
    /// Free-form annotations, stored but never published.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl CreateStatusListParams {
    /// Parameters with every optional field unset.
    pub fn new(issuer_id: IssuerId, purpose: StatusPurpose) -> Self {
        Self {
            issuer_id,
            purpose,
            status_size: None,
            total_entries: None,
            ttl: None,
            metadata: None,
        }
    }

    pub fn with_status_size(mut self, status_size: u32) -> Self {
        self.status_size = Some(status_size);
        self
    }

    pub fn with_total_entries(mut self, total_entries: u64) -> Self {
        self.total_entries = Some(total_entries);
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Parameters after defaults have been applied and bounds checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedParams {
    /// Resolved slot width.
    pub status_size: StatusSize,
    /// Resolved capacity.
    pub total_entries: u64,
    /// TTL in milliseconds, non-negative and at most [`MAX_TTL_MS`].
    pub ttl: Option<u64>,
}

/// Check creation parameters and resolve defaults.
///
/// `issuerId` and `purpose` are already typed, so an empty issuer or an
/// unknown purpose was rejected when the request was parsed.
pub fn validate_params(params: &CreateStatusListParams) -> Result<ValidatedParams, ValidationError> {
    if params.issuer_id.as_str().trim().is_empty() {
        return Err(ValidationError::MissingIssuer);
    }
    let status_size = StatusSize::from_requested(params.status_size)?;

    let total_entries = params.total_entries.unwrap_or(DEFAULT_TOTAL_ENTRIES);
    if total_entries < MIN_TOTAL_ENTRIES {
        return Err(ValidationError::TotalEntriesBelowMinimum(total_entries));
    }
    if total_entries > MAX_TOTAL_ENTRIES {
        return Err(ValidationError::TotalEntriesAboveMaximum {
            requested: total_entries,
            max: MAX_TOTAL_ENTRIES,
        });
    }

    Ok(ValidatedParams {
        status_size,
        total_entries,
        ttl: validate_ttl(params.ttl)?,
    })
}

pub(crate) fn validate_ttl(ttl: Option<i64>) -> Result<Option<u64>, ValidationError> {
    let Some(ms) = ttl else {
        return Ok(None);
    };
    let ttl = u64::try_from(ms).map_err(|_| ValidationError::NegativeTtl(ms))?;
    if ttl > MAX_TTL_MS {
        return Err(ValidationError::TtlTooLarge {
            requested: ms,
            max: MAX_TTL_MS,
        });
    }
    Ok(Some(ttl))
}

/// Persisted shape of a status list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusListRecord {
    pub id: StatusListId,
    pub issuer_id: IssuerId,
    pub purpose: StatusPurpose,
    pub status_size: StatusSize,
    /// Slot capacity. Fixed at creation.
    pub total_entries: u64,
    /// Slots handed out so far; also the next free index.
    pub used_entries: u64,
    /// Gzip-compressed, multibase base64url bitstring.
    pub encoded_list: String,
    /// Milliseconds from `created_at` to the document's `validUntil`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One compressed bitstring shared by a group of credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatusList {
    record: StatusListRecord,
}

impl StatusList {
    /// Validate `params` and build a list with every slot at code 0.
    pub fn create(params: CreateStatusListParams) -> Result<Self, StatusListError> {
        let validated = validate_params(&params)?;
        let buffer = zeroed(validated.total_entries, validated.status_size);
        let encoded_list = encode(&buffer)?;
        let now = Timestamp::now();

        Ok(Self {
            record: StatusListRecord {
                id: StatusListId::new(),
                issuer_id: params.issuer_id,
                purpose: params.purpose,
                status_size: validated.status_size,
                total_entries: validated.total_entries,
                used_entries: 0,
                encoded_list,
                ttl: validated.ttl,
                metadata: params.metadata,
                created_at: now,
                updated_at: now,
            },
        })
    }

    /// Rehydrate a stored record without re-validating it.
    pub fn from_persisted(record: StatusListRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &StatusListRecord {
        &self.record
    }

    pub fn into_record(self) -> StatusListRecord {
        self.record
    }

    pub fn id(&self) -> StatusListId {
        self.record.id
    }

    pub fn issuer_id(&self) -> &IssuerId {
        &self.record.issuer_id
    }

    pub fn purpose(&self) -> StatusPurpose {
        self.record.purpose
    }

    pub fn status_size(&self) -> StatusSize {
        self.record.status_size
    }

    pub fn total_entries(&self) -> u64 {
        self.record.total_entries
    }

    pub fn used_entries(&self) -> u64 {
        self.record.used_entries
    }

    pub fn encoded_list(&self) -> &str {
        &self.record.encoded_list
    }

    /// Cache lifetime of the rendered document in milliseconds.
    pub fn ttl(&self) -> Option<u64> {
        self.record.ttl
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.record.metadata.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.record.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.record.updated_at
    }

    /// Whether another slot can be allocated.
    pub fn has_capacity(&self) -> bool {
        self.record.used_entries < self.record.total_entries
    }

    /// Consume one slot and return its index, or `None` when full.
    ///
    /// The returned value is the pre-increment `usedEntries`.
    pub fn increment_used_entries(&mut self) -> Option<u64> {
        if !self.has_capacity() {
            return None;
        }
        let index = self.record.used_entries;
        self.record.used_entries += 1;
        self.touch();
        Some(index)
    }

    /// Replace the encoded bitstring.
    pub fn update_encoded_list(&mut self, encoded_list: String) {
        self.record.encoded_list = encoded_list;
        self.touch();
    }

    /// Code currently stored at `index`.
    pub fn status_at(&self, index: u64) -> Result<u8, StatusListError> {
        self.check_index(index)?;
        let buffer = decode(&self.record.encoded_list)?;
        Ok(read_status(&buffer, index, self.record.status_size)?)
    }

    /// Store `status` at `index` and re-encode the bitstring.
    ///
    /// The bitstring is decoded from the current `encodedList`, so writes
    /// to other slots made since this list was loaded are preserved only if
    /// the caller holds the latest copy.
    pub fn set_status(&mut self, index: u64, status: u32) -> Result<u8, StatusListError> {
        self.check_index(index)?;
        let code = self.record.status_size.check(status)?;
        let mut buffer = decode(&self.record.encoded_list)?;
        write_status(&mut buffer, index, self.record.status_size, code)?;
        self.update_encoded_list(encode(&buffer)?);
        Ok(code)
    }

    /// Change the cache lifetime. Negative values are rejected.
    pub fn set_ttl(&mut self, ttl: Option<i64>) -> Result<(), ValidationError> {
        self.record.ttl = validate_ttl(ttl)?;
        self.touch();
        Ok(())
    }

    pub fn set_metadata(&mut self, metadata: Option<Map<String, Value>>) {
        self.record.metadata = metadata;
        self.touch();
    }

    /// End of validity of the rendered document: `createdAt + ttl`.
    pub fn valid_until(&self) -> Option<Timestamp> {
        self.record
            .ttl
            .and_then(|ttl| self.record.created_at.checked_add_millis(ttl))
    }

    /// One message per code, ascending, labelled by purpose.
    pub fn default_status_messages(&self) -> Vec<StatusMessage> {
        let purpose = self.record.purpose;
        (0..self.record.status_size.code_count())
            .filter_map(|code| u8::try_from(code).ok())
            .map(|code| StatusMessage::new(code, purpose.label(code)))
            .collect()
    }

    /// The `BitstringStatusList` descriptor for this list.
    ///
    /// `statusSize` and `statusMessages` are only emitted for multi-bit
    /// lists.
    pub fn render_status_list_claim(&self) -> BitstringStatusList {
        let multi_bit = self.record.status_size != StatusSize::One;
        BitstringStatusList {
            id: None,
            kind: BITSTRING_STATUS_LIST_TYPE.to_string(),
            status_purpose: self.record.purpose,
            encoded_list: self.record.encoded_list.clone(),
            ttl: self.record.ttl,
            status_size: multi_bit.then_some(self.record.status_size),
            status_messages: multi_bit.then(|| self.default_status_messages()),
        }
    }

    /// The unsigned `BitstringStatusListCredential` published at `list_url`.
    pub fn render_status_list_credential(
        &self,
        issuer: impl Into<Issuer>,
        list_url: &str,
    ) -> StatusListCredential {
        let mut subject = self.render_status_list_claim();
        subject.id = Some(format!("{list_url}#list"));

        StatusListCredential {
            context: ContextValue::default(),
            id: Some(list_url.to_string()),
            credential_type: CredentialTypeValue::Array(vec![
                VERIFIABLE_CREDENTIAL_TYPE.to_string(),
                BITSTRING_STATUS_LIST_CREDENTIAL_TYPE.to_string(),
            ]),
            issuer: issuer.into(),
            valid_from: Some(self.record.created_at.into()),
            valid_until: self.valid_until().map(Into::into),
            credential_subject: subject,
            proof: None,
        }
    }

    fn check_index(&self, index: u64) -> Result<(), ValidationError> {
        if index >= self.record.total_entries {
            return Err(ValidationError::IndexOutOfRange {
                index,
                total_entries: self.record.total_entries,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.record.updated_at = Timestamp::now();
    }
}
