use lockgate_core::{Credential, SecurityLevel};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Row of the `locker_access` table
///
/// Column names follow the existing schema of deployed locker databases
/// (`sec_lvl`, `locker_num`), which is why this row type is kept separate
/// from the domain [`Credential`].
///
/// # Database Schema
///
/// - `qr_code` is the primary key and the only lookup column
/// - `sec_lvl` is constrained to `'LOW'` or `'HIGH'`
/// - `locker_num` is not constrained; values outside `0..=3` are valid rows
///   that simply open nothing
///
/// # Examples
///
/// ```
/// use lockgate_storage::models::CredentialRow;
/// use lockgate_core::{Credential, SecurityLevel};
///
/// let row = CredentialRow {
///     qr_code: "ABC123".to_string(),
///     locker_num: 1,
///     sec_lvl: "LOW".to_string(),
///     owner_name: "Alice".to_string(),
/// };
///
/// let credential = Credential::try_from(row).unwrap();
/// assert_eq!(credential.security_level, SecurityLevel::Low);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CredentialRow {
    pub qr_code: String,
    pub locker_num: i64,
    pub sec_lvl: String,
    pub owner_name: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = StorageError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let security_level: SecurityLevel = row.sec_lvl.parse().map_err(|e| {
            StorageError::Validation(format!("credential {}: {}", row.qr_code, e))
        })?;

        Ok(Credential {
            qr_code: row.qr_code,
            owner_name: row.owner_name,
            locker_num: row.locker_num,
            security_level,
        })
    }
}

impl From<&Credential> for CredentialRow {
    fn from(credential: &Credential) -> Self {
        Self {
            qr_code: credential.qr_code.clone(),
            locker_num: credential.locker_num,
            sec_lvl: credential.security_level.as_str().to_string(),
            owner_name: credential.owner_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_unknown_level_is_rejected() {
        let row = CredentialRow {
            qr_code: "Q1".to_string(),
            locker_num: 2,
            sec_lvl: "MEDIUM".to_string(),
            owner_name: "Carol".to_string(),
        };

        let err = Credential::try_from(row).unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert!(err.to_string().contains("Q1"));
    }

    #[test]
    fn test_row_from_credential() {
        let credential = Credential::new("XYZ999", "Bob", 2, SecurityLevel::High);
        let row = CredentialRow::from(&credential);

        assert_eq!(row.sec_lvl, "HIGH");
        assert_eq!(row.locker_num, 2);
        assert_eq!(Credential::try_from(row).unwrap(), credential);
    }
}
