use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `access_history` table
///
/// One row exists per locker command that reached the controller. Rows are
/// append-only: the storage layer exposes no update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessRecord {
    /// Auto-increment primary key
    pub id: i64,

    pub owner_name: String,

    pub locker_num: i64,

    /// Security tier at the time of access (`"LOW"` or `"HIGH"`)
    pub sec_lvl: String,

    pub qr_code: String,

    /// When the command was dispatched
    pub logged_at: DateTime<Utc>,
}

impl AccessRecord {
    /// Returns `true` if this access went through operator confirmation.
    pub fn was_confirmed(&self) -> bool {
        self.sec_lvl == lockgate_core::constants::SEC_LVL_HIGH
    }
}
