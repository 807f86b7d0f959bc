#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::AccessRecord;
use lockgate_core::AccessEvent;
use sqlx::SqlitePool;

/// Append-only audit trail of dispatched locker commands
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait AuditStore: Send + Sync {
    /// Append one access event, returning its row id
    ///
    /// The write is committed before this returns.
    async fn append(&self, event: &AccessEvent) -> StorageResult<i64>;

    /// Most recent records, newest first
    async fn recent(&self, limit: i64) -> StorageResult<Vec<AccessRecord>>;

    /// Number of records for one QR payload
    async fn count_for_code(&self, qr_code: &str) -> StorageResult<i64>;
}

/// SQLite implementation of AuditStore backed by `access_history`
#[derive(Debug, Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Create a new SQLite audit store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuditStore for SqliteAuditStore {
    async fn append(&self, event: &AccessEvent) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO access_history (owner_name, locker_num, sec_lvl, qr_code, logged_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.owner_name)
        .bind(event.locker_num)
        .bind(event.security_level.as_str())
        .bind(&event.qr_code)
        .bind(event.logged_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: i64) -> StorageResult<Vec<AccessRecord>> {
        let records = sqlx::query_as::<_, AccessRecord>(
            r#"
            SELECT id, owner_name, locker_num, sec_lvl, qr_code, logged_at
            FROM access_history
            ORDER BY logged_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn count_for_code(&self, qr_code: &str) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM access_history WHERE qr_code = ?")
            .bind(qr_code)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}
