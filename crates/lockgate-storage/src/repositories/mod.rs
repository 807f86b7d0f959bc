pub mod access_history;
pub mod credential;

pub use access_history::{AuditStore, SqliteAuditStore};
pub use credential::{CredentialStore, SqliteCredentialStore};
