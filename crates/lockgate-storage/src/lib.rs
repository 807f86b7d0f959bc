//! Storage layer for the locker gate.
//!
//! This crate provides SQLite-backed persistence for the two stores the scan
//! pipeline depends on: the credential store (`locker_access`), which maps a
//! QR payload to an owner, a locker and a security tier, and the audit store
//! (`access_history`), which records every locker command that was sent.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with embedded migrations
//! - [`CredentialStore`], [`AuditStore`] - Capability traits consumed by the pipeline
//! - [`SqliteCredentialStore`], [`SqliteAuditStore`] - SQLite implementations
//! - [`MemoryCredentialStore`], [`MemoryAuditStore`] - In-memory implementations for tests
//!
//! The pipeline only sees the traits, so tests can substitute fakes and the
//! connection lifecycle stays with the binary.
//!
//! # Examples
//!
//! ```no_run
//! use lockgate_storage::{Database, DatabaseConfig, CredentialStore, SqliteCredentialStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("lockgate.db")).await?;
//! let credentials = SqliteCredentialStore::new(db.pool().clone());
//!
//! if let Some(credential) = credentials.find_by_qr_code("ABC123").await? {
//!     println!("{} -> locker {}", credential.owner_name, credential.locker_num);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # SQL Injection Prevention
//!
//! All queries use parameterized statements via SQLx.

pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use memory::{MemoryAuditStore, MemoryCredentialStore};
pub use models::{AccessRecord, CredentialRow};
pub use repositories::{AuditStore, CredentialStore, SqliteAuditStore, SqliteCredentialStore};
