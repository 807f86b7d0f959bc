use chrono::Utc;
use lockgate_core::{AccessEvent, Credential};
use lockgate_storage::{AuditStore, StorageResult};
use tracing::info;

/// Records dispatched commands in the audit store.
#[derive(Debug, Clone)]
pub struct AuditLogger<S> {
    store: S,
}

impl<S: AuditStore> AuditLogger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append one access event for `credential`, stamped with the current
    /// wall-clock time. The row is committed before this returns.
    pub async fn record(&self, credential: &Credential) -> StorageResult<AccessEvent> {
        let event = AccessEvent::for_credential(credential, Utc::now());
        let id = self.store.append(&event).await?;

        info!(
            id,
            owner = %event.owner_name,
            locker_num = event.locker_num,
            "Access logged"
        );
        Ok(event)
    }
}
