#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::CredentialRow;
use lockgate_core::Credential;
use sqlx::SqlitePool;

/// Read-only credential lookup
///
/// The scan pipeline only ever resolves a token to a credential; issuing and
/// revoking credentials is done outside the gate.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait CredentialStore: Send + Sync {
    /// Exact-match lookup by QR payload
    async fn find_by_qr_code(&self, qr_code: &str) -> StorageResult<Option<Credential>>;
}

/// SQLite implementation of CredentialStore backed by `locker_access`
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    /// Create a new SQLite credential store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a credential
    ///
    /// Used to seed fixtures; the gate itself never writes credentials.
    pub async fn upsert(&self, credential: &Credential) -> StorageResult<()> {
        let row = CredentialRow::from(credential);

        sqlx::query(
            r#"
            INSERT INTO locker_access (qr_code, locker_num, sec_lvl, owner_name)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(qr_code) DO UPDATE SET
                locker_num = excluded.locker_num,
                sec_lvl = excluded.sec_lvl,
                owner_name = excluded.owner_name
            "#,
        )
        .bind(&row.qr_code)
        .bind(row.locker_num)
        .bind(&row.sec_lvl)
        .bind(&row.owner_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of stored credentials
    pub async fn count(&self) -> StorageResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM locker_access")
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}

impl CredentialStore for SqliteCredentialStore {
    async fn find_by_qr_code(&self, qr_code: &str) -> StorageResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT qr_code, locker_num, sec_lvl, owner_name
            FROM locker_access
            WHERE qr_code = ?
            "#,
        )
        .bind(qr_code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Credential::try_from).transpose()
    }
}
