//! In-memory stores for testing and development.
//!
//! These implement the same capability traits as the SQLite stores but keep
//! everything in a `Vec` behind a mutex. They never touch a worker thread, so
//! they are safe to use under Tokio's paused test clock.

use crate::error::{StorageError, StorageResult};
use crate::models::AccessRecord;
use crate::repositories::{AuditStore, CredentialStore};
use lockgate_core::{AccessEvent, Credential};
use std::sync::{Arc, Mutex, MutexGuard};

/// Credential store holding a fixed set of credentials.
///
/// # Examples
///
/// ```
/// use lockgate_core::{Credential, SecurityLevel};
/// use lockgate_storage::{CredentialStore, MemoryCredentialStore};
///
/// # async fn example() -> lockgate_storage::StorageResult<()> {
/// let store = MemoryCredentialStore::with_credentials([
///     Credential::new("ABC123", "Alice", 1, SecurityLevel::Low),
/// ]);
/// assert!(store.find_by_qr_code("ABC123").await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: Arc<Mutex<Vec<Credential>>>,
    lookups: Arc<Mutex<usize>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let store = Self::new();
        for credential in credentials {
            store.insert(credential);
        }
        store
    }

    /// Insert a credential, replacing any with the same QR payload.
    pub fn insert(&self, credential: Credential) {
        let mut credentials = lock(&self.credentials);
        credentials.retain(|c| c.qr_code != credential.qr_code);
        credentials.push(credential);
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        *lock(&self.lookups)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_qr_code(&self, qr_code: &str) -> StorageResult<Option<Credential>> {
        *lock(&self.lookups) += 1;

        Ok(lock(&self.credentials)
            .iter()
            .find(|c| c.qr_code == qr_code)
            .cloned())
    }
}

/// Append-only audit store backed by a `Vec`.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    events: Arc<Mutex<Vec<AccessEvent>>>,
    failing: bool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose appends always fail, as a closed pool would.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Snapshot of every appended event, oldest first.
    pub fn events(&self) -> Vec<AccessEvent> {
        lock(&self.events).clone()
    }
}

impl AuditStore for MemoryAuditStore {
    async fn append(&self, event: &AccessEvent) -> StorageResult<i64> {
        if self.failing {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }

        let mut events = lock(&self.events);
        events.push(event.clone());
        Ok(events.len() as i64)
    }

    async fn recent(&self, limit: i64) -> StorageResult<Vec<AccessRecord>> {
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(lock(&self.events)
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(index, event)| AccessRecord {
                id: index as i64 + 1,
                owner_name: event.owner_name.clone(),
                locker_num: event.locker_num,
                sec_lvl: event.security_level.as_str().to_string(),
                qr_code: event.qr_code.clone(),
                logged_at: event.logged_at,
            })
            .collect())
    }

    async fn count_for_code(&self, qr_code: &str) -> StorageResult<i64> {
        Ok(lock(&self.events)
            .iter()
            .filter(|e| e.qr_code == qr_code)
            .count() as i64)
    }
}

// A poisoned lock only means another test thread panicked mid-push.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
