use lockgate_core::{Credential, ScanToken};
use lockgate_storage::{CredentialStore, StorageResult};
use tracing::debug;

/// Looks up the credential bound to a scan token.
#[derive(Debug, Clone)]
pub struct CredentialResolver<S> {
    store: S,
}

impl<S: CredentialStore> CredentialResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exact-match lookup. `Ok(None)` means the token is unknown.
    ///
    /// # Errors
    ///
    /// Store failures are returned unchanged.
    pub async fn resolve(&self, token: &ScanToken) -> StorageResult<Option<Credential>> {
        let credential = self.store.find_by_qr_code(token.as_str()).await?;
        debug!(qr_code = %token, found = credential.is_some(), "Credential lookup");
        Ok(credential)
    }
}
