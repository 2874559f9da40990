//! # PostgreSQL Repository
//!
//! Tables `status_lists` and `status_entries` (see `migrations/`). The
//! unique constraints on `(credential_id, purpose)` and
//! `(status_list_id, status_list_index)` back the in-process checks.
//!
//! Allocation locks the list row (`SELECT … FOR UPDATE`) before checking
//! the requested index, so concurrent allocators on one list serialize in
//! the database. A status change locks the entry row, then its list row,
//! and recomputes the bitstring from the locked copy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use credstatus_core::{
    CredentialId, IssuerId, StatusEntryId, StatusListId, StatusPurpose, StatusSize, Timestamp,
};
use credstatus_list::{
    CreateStatusListParams, NewStatusEntry, StatusEntry, StatusList, StatusListRecord,
    StatusUpdate, StatusUpdateResult,
};

use crate::error::StoreError;
use crate::repository::{check_allocation, StatusListRepository};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set, in which case the caller
/// wires [`InMemoryStatusListRepository`](crate::InMemoryStatusListRepository).
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set, status lists are kept in memory and \
                 will not survive restarts"
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Status list migrations applied");

    Ok(Some(pool))
}

/// [`StatusListRepository`] over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStatusListRepository {
    pool: PgPool,
}

impl PgStatusListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn lock_list(
        tx: &mut Transaction<'_, Postgres>,
        id: StatusListId,
    ) -> Result<Option<StatusList>, StoreError> {
        let row = sqlx::query_as::<_, StatusListRow>(
            "SELECT id, issuer_id, purpose, status_size, total_entries, used_entries,
                    encoded_list, ttl, metadata, created_at, updated_at
             FROM status_lists WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;

        row.map(|r| r.into_record().map(StatusList::from_persisted))
            .transpose()
    }

    async fn apply_update(&self, update: &StatusUpdate) -> Result<StatusUpdateResult, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, StatusEntryRow>(
            "SELECT id, credential_id, status_list_id, status_list_index, status_size,
                    purpose, current_status, created_at, updated_at
             FROM status_entries WHERE credential_id = $1 AND purpose = $2 FOR UPDATE",
        )
        .bind(update.credential_id.as_str())
        .bind(update.purpose.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(StatusUpdateResult::entry_not_found(
                &update.credential_id,
                update.purpose,
            ));
        };
        let mut entry = row.into_entry()?;

        let Some(mut list) = Self::lock_list(&mut tx, entry.status_list_id).await? else {
            return Ok(StatusUpdateResult::list_not_found(entry.status_list_id));
        };
        entry.apply_status(&mut list, update.status)?;

        sqlx::query("UPDATE status_lists SET encoded_list = $1, updated_at = $2 WHERE id = $3")
            .bind(list.encoded_list())
            .bind(*list.updated_at().as_datetime())
            .bind(*list.id().as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE status_entries SET current_status = $1, updated_at = $2 WHERE id = $3")
            .bind(i16::from(entry.current_status))
            .bind(*entry.updated_at.as_datetime())
            .bind(*entry.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(StatusUpdateResult::updated(entry))
    }
}

#[async_trait]
impl StatusListRepository for PgStatusListRepository {
    async fn create_status_list(
        &self,
        params: CreateStatusListParams,
    ) -> Result<StatusList, StoreError> {
        let list = StatusList::create(params)?;
        let record = list.record();

        sqlx::query(
            "INSERT INTO status_lists (id, issuer_id, purpose, status_size, total_entries,
                                       used_entries, encoded_list, ttl, metadata, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(*record.id.as_uuid())
        .bind(record.issuer_id.as_str())
        .bind(record.purpose.as_str())
        .bind(i16::from(record.status_size.bits()))
        .bind(to_i64(record.total_entries)?)
        .bind(to_i64(record.used_entries)?)
        .bind(&record.encoded_list)
        .bind(record.ttl.map(to_i64).transpose()?)
        .bind(record.metadata.clone().map(serde_json::Value::Object))
        .bind(*record.created_at.as_datetime())
        .bind(*record.updated_at.as_datetime())
        .execute(&self.pool)
        .await?;

        Ok(list)
    }

    async fn find_by_id(&self, id: StatusListId) -> Result<Option<StatusList>, StoreError> {
        let row = sqlx::query_as::<_, StatusListRow>(
            "SELECT id, issuer_id, purpose, status_size, total_entries, used_entries,
                    encoded_list, ttl, metadata, created_at, updated_at
             FROM status_lists WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_record().map(StatusList::from_persisted))
            .transpose()
    }

    async fn find_available_status_list(
        &self,
        issuer_id: &IssuerId,
        purpose: StatusPurpose,
        status_size: StatusSize,
    ) -> Result<Option<StatusList>, StoreError> {
        let row = sqlx::query_as::<_, StatusListRow>(
            "SELECT id, issuer_id, purpose, status_size, total_entries, used_entries,
                    encoded_list, ttl, metadata, created_at, updated_at
             FROM status_lists
             WHERE issuer_id = $1 AND purpose = $2 AND status_size = $3
               AND used_entries < total_entries
             ORDER BY created_at, id
             LIMIT 1",
        )
        .bind(issuer_id.as_str())
        .bind(purpose.as_str())
        .bind(i16::from(status_size.bits()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_record().map(StatusList::from_persisted))
            .transpose()
    }

    async fn update(&self, list: &StatusList) -> Result<StatusList, StoreError> {
        let row = sqlx::query_as::<_, StatusListRow>(
            "UPDATE status_lists SET ttl = $1, metadata = $2, updated_at = $3
             WHERE id = $4
             RETURNING id, issuer_id, purpose, status_size, total_entries, used_entries,
                       encoded_list, ttl, metadata, created_at, updated_at",
        )
        .bind(list.ttl().map(to_i64).transpose()?)
        .bind(list.metadata().cloned().map(serde_json::Value::Object))
        .bind(*list.updated_at().as_datetime())
        .bind(*list.id().as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::StatusListNotFound(list.id()))?;
        Ok(StatusList::from_persisted(row.into_record()?))
    }

    async fn create_status_entry(&self, mut params: NewStatusEntry) -> Result<StatusEntry, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut list = Self::lock_list(&mut tx, params.status_list_id)
            .await?
            .ok_or(StoreError::StatusListNotFound(params.status_list_id))?;
        check_allocation(&list, &params)?;
        let index = list
            .increment_used_entries()
            .ok_or(StoreError::ListFull(list.id()))?;
        let requested = params.status_list_index;
        params.status_list_index = index;

        sqlx::query("UPDATE status_lists SET used_entries = $1, updated_at = $2 WHERE id = $3")
            .bind(to_i64(list.used_entries())?)
            .bind(*list.updated_at().as_datetime())
            .bind(*list.id().as_uuid())
            .execute(&mut *tx)
            .await?;

        let entry = StatusEntry::new(params);
        let inserted = sqlx::query(
            "INSERT INTO status_entries (id, credential_id, status_list_id, status_list_index,
                                         status_size, purpose, current_status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(*entry.id.as_uuid())
        .bind(entry.credential_id.as_str())
        .bind(*entry.status_list_id.as_uuid())
        .bind(to_i64(entry.status_list_index)?)
        .bind(i16::from(entry.status_size.bits()))
        .bind(entry.purpose.as_str())
        .bind(i16::from(entry.current_status))
        .bind(*entry.created_at.as_datetime())
        .bind(*entry.updated_at.as_datetime())
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            return Err(if duplicate {
                StoreError::DuplicateEntry {
                    credential_id: entry.credential_id,
                    purpose: entry.purpose,
                }
            } else {
                StoreError::Database(e)
            });
        }

        tx.commit().await?;
        tracing::debug!(status_list_id = %list.id(), requested, index, "allocated status slot");
        Ok(entry)
    }

    async fn find_status_entry(
        &self,
        credential_id: &CredentialId,
        purpose: StatusPurpose,
    ) -> Result<Option<StatusEntry>, StoreError> {
        let row = sqlx::query_as::<_, StatusEntryRow>(
            "SELECT id, credential_id, status_list_id, status_list_index, status_size,
                    purpose, current_status, created_at, updated_at
             FROM status_entries WHERE credential_id = $1 AND purpose = $2",
        )
        .bind(credential_id.as_str())
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatusEntryRow::into_entry).transpose()
    }

    async fn update_credential_status(&self, update: StatusUpdate) -> StatusUpdateResult {
        self.apply_update(&update).await.unwrap_or_else(|e| {
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

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::ColumnOverflow(value))
}

fn corrupt(table: &'static str, id: Uuid, reason: impl ToString) -> StoreError {
    let err = StoreError::Corrupt {
        table,
        id: id.to_string(),
        reason: reason.to_string(),
    };
    tracing::warn!(error = %err, "unreadable status row");
    err
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct StatusListRow {
    id: Uuid,
    issuer_id: String,
    purpose: String,
    status_size: i16,
    total_entries: i64,
    used_entries: i64,
    encoded_list: String,
    ttl: Option<i64>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StatusListRow {
    fn into_record(self) -> Result<StatusListRecord, StoreError> {
        const TABLE: &str = "status_lists";
        let id = self.id;
        let metadata = match self.metadata {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Object(map)) => Some(map),
            Some(_) => return Err(corrupt(TABLE, id, "metadata is not an object")),
        };

        Ok(StatusListRecord {
            id: StatusListId::from_uuid(id),
            issuer_id: IssuerId::new(self.issuer_id).map_err(|e| corrupt(TABLE, id, e))?,
            purpose: self.purpose.parse().map_err(|e| corrupt(TABLE, id, e))?,
            status_size: size_from_column(self.status_size).map_err(|e| corrupt(TABLE, id, e))?,
            total_entries: u64::try_from(self.total_entries).map_err(|e| corrupt(TABLE, id, e))?,
            used_entries: u64::try_from(self.used_entries).map_err(|e| corrupt(TABLE, id, e))?,
            encoded_list: self.encoded_list,
            ttl: self
                .ttl
                .map(u64::try_from)
                .transpose()
                .map_err(|e| corrupt(TABLE, id, e))?,
            metadata,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct StatusEntryRow {
    id: Uuid,
    credential_id: String,
    status_list_id: Uuid,
    status_list_index: i64,
    status_size: i16,
    purpose: String,
    current_status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StatusEntryRow {
    fn into_entry(self) -> Result<StatusEntry, StoreError> {
        const TABLE: &str = "status_entries";
        let id = self.id;
        Ok(StatusEntry {
            id: StatusEntryId::from_uuid(id),
            credential_id: CredentialId::new(self.credential_id).map_err(|e| corrupt(TABLE, id, e))?,
            status_list_id: StatusListId::from_uuid(self.status_list_id),
            status_list_index: u64::try_from(self.status_list_index)
                .map_err(|e| corrupt(TABLE, id, e))?,
            status_size: size_from_column(self.status_size).map_err(|e| corrupt(TABLE, id, e))?,
            purpose: self.purpose.parse().map_err(|e| corrupt(TABLE, id, e))?,
            current_status: u8::try_from(self.current_status).map_err(|e| corrupt(TABLE, id, e))?,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
        })
    }
}

fn size_from_column(bits: i16) -> Result<StatusSize, String> {
    u32::try_from(bits)
        .map_err(|e| e.to_string())
        .and_then(|b| StatusSize::try_from(b).map_err(|e| e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn list_row() -> StatusListRow {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        StatusListRow {
            id: Uuid::new_v4(),
            issuer_id: "did:web:issuer.example".to_string(),
            purpose: "suspension".to_string(),
            status_size: 2,
            total_entries: 131_072,
            used_entries: 17,
            encoded_list: "uH4sIAAAAAAAA".to_string(),
            ttl: Some(60_000),
            metadata: Some(json!({"cohort": "2026"})),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn list_row_maps_to_record() {
        let record = list_row().into_record().unwrap();
        assert_eq!(record.purpose, StatusPurpose::Suspension);
        assert_eq!(record.status_size, StatusSize::Two);
        assert_eq!(record.used_entries, 17);
        assert_eq!(record.ttl, Some(60_000));
        assert_eq!(record.metadata.unwrap()["cohort"], "2026");
    }

    #[test]
    fn corrupt_list_rows_are_errors() {
        let mut row = list_row();
        row.purpose = "bogus".to_string();
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));

        let mut row = list_row();
        row.status_size = 3;
        assert!(row.into_record().is_err());

        let mut row = list_row();
        row.metadata = Some(json!(["not", "an", "object"]));
        assert!(row.into_record().is_err());

        let mut row = list_row();
        row.ttl = Some(-1);
        assert!(row.into_record().is_err());
    }

    #[test]
    fn entry_row_maps_to_entry() {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        let row = StatusEntryRow {
            id: Uuid::new_v4(),
            credential_id: "urn:uuid:cred-1".to_string(),
            status_list_id: Uuid::new_v4(),
            status_list_index: 4,
            status_size: 1,
            purpose: "revocation".to_string(),
            current_status: 1,
            created_at: at,
            updated_at: at,
        };
        let entry = row.into_entry().unwrap();
        assert_eq!(entry.status_list_index, 4);
        assert_eq!(entry.current_status, 1);
        assert_eq!(entry.credential_id.as_str(), "urn:uuid:cred-1");
    }
}
