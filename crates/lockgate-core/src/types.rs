use crate::{
    Result,
    constants::{
        CMD_OPEN_1, CMD_OPEN_2, CMD_OPEN_3, CMD_OPEN_ALL, COMMAND_TERMINATOR, LOCKER_ALL,
        SEC_LVL_HIGH, SEC_LVL_LOW,
    },
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload reconstructed from a single QR scan.
///
/// Tokens are never empty and contain only ASCII letters and digits, which is
/// everything the key decoder can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanToken(String);

impl ScanToken {
    /// Create a new scan token with validation.
    ///
    /// Surrounding whitespace is trimmed before validation. Case is preserved,
    /// since shift state is part of the scanned payload.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` if the token is empty or contains
    /// anything other than ASCII letters and digits.
    pub fn new(value: &str) -> Result<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(Error::InvalidToken("token is empty".to_string()));
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidToken(format!(
                "token must be ASCII alphanumeric, got {value:?}"
            )));
        }

        Ok(ScanToken(value.to_string()))
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ScanToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScanToken::new(s)
    }
}

impl AsRef<str> for ScanToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Security tier attached to a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityLevel {
    /// Opens immediately after a successful lookup.
    Low,
    /// Requires an operator to type the confirmation keyword.
    High,
}

impl SecurityLevel {
    /// Stored/wire representation (`"LOW"` or `"HIGH"`).
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::Low => SEC_LVL_LOW,
            SecurityLevel::High => SEC_LVL_HIGH,
        }
    }

    /// Returns `true` if this tier needs a human confirmation step.
    #[inline]
    #[must_use]
    pub fn requires_confirmation(self) -> bool {
        matches!(self, SecurityLevel::High)
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecurityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            SEC_LVL_LOW => Ok(SecurityLevel::Low),
            SEC_LVL_HIGH => Ok(SecurityLevel::High),
            other => Err(Error::InvalidSecurityLevel(other.to_string())),
        }
    }
}

/// A stored QR credential.
///
/// Credentials are owned by the credential store and never modified by the
/// scan pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique QR payload.
    pub qr_code: String,

    /// Person the credential was issued to.
    pub owner_name: String,

    /// Locker the credential opens (`0` opens all lockers).
    pub locker_num: i64,

    /// Security tier.
    pub security_level: SecurityLevel,
}

impl Credential {
    pub fn new(
        qr_code: impl Into<String>,
        owner_name: impl Into<String>,
        locker_num: i64,
        security_level: SecurityLevel,
    ) -> Self {
        Self {
            qr_code: qr_code.into(),
            owner_name: owner_name.into(),
            locker_num,
            security_level,
        }
    }
}

/// Command understood by the locker controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockerCommand {
    Open1,
    Open2,
    Open3,
    OpenAll,
}

impl LockerCommand {
    /// Map a locker number to its command.
    ///
    /// `0` maps to [`LockerCommand::OpenAll`], `1..=3` to the matching locker.
    /// Every other value has no command.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockgate_core::LockerCommand;
    ///
    /// assert_eq!(LockerCommand::from_locker_num(0), Some(LockerCommand::OpenAll));
    /// assert_eq!(LockerCommand::from_locker_num(2), Some(LockerCommand::Open2));
    /// assert_eq!(LockerCommand::from_locker_num(4), None);
    /// ```
    #[must_use]
    pub fn from_locker_num(locker_num: i64) -> Option<Self> {
        match locker_num {
            LOCKER_ALL => Some(LockerCommand::OpenAll),
            1 => Some(LockerCommand::Open1),
            2 => Some(LockerCommand::Open2),
            3 => Some(LockerCommand::Open3),
            _ => None,
        }
    }

    /// Command text without the line terminator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LockerCommand::Open1 => CMD_OPEN_1,
            LockerCommand::Open2 => CMD_OPEN_2,
            LockerCommand::Open3 => CMD_OPEN_3,
            LockerCommand::OpenAll => CMD_OPEN_ALL,
        }
    }

    /// Full line written to the actuator link, terminator included.
    #[must_use]
    pub fn wire_line(self) -> String {
        format!("{}{}", self.as_str(), COMMAND_TERMINATOR)
    }
}

impl fmt::Display for LockerCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of a dispatched locker command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub owner_name: String,
    pub locker_num: i64,
    pub security_level: SecurityLevel,
    pub qr_code: String,
    pub logged_at: DateTime<Utc>,
}

impl AccessEvent {
    /// Build the audit record for a credential that was just dispatched.
    pub fn for_credential(credential: &Credential, logged_at: DateTime<Utc>) -> Self {
        Self {
            owner_name: credential.owner_name.clone(),
            locker_num: credential.locker_num,
            security_level: credential.security_level,
            qr_code: credential.qr_code.clone(),
            logged_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ABC123", "ABC123")]
    #[case("  abc123 ", "abc123")]
    #[case("XyZ999", "XyZ999")]
    fn test_scan_token_valid(#[case] input: &str, #[case] expected: &str) {
        let token: ScanToken = input.parse().unwrap();
        assert_eq!(token.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("ABC-123")]
    #[case("ÁBC")]
    fn test_scan_token_invalid(#[case] input: &str) {
        assert!(ScanToken::new(input).is_err());
    }

    #[rstest]
    #[case(0, Some(LockerCommand::OpenAll))]
    #[case(1, Some(LockerCommand::Open1))]
    #[case(2, Some(LockerCommand::Open2))]
    #[case(3, Some(LockerCommand::Open3))]
    #[case(4, None)]
    #[case(-1, None)]
    #[case(99, None)]
    fn test_locker_command_mapping(#[case] locker: i64, #[case] expected: Option<LockerCommand>) {
        assert_eq!(LockerCommand::from_locker_num(locker), expected);
    }

    #[test]
    fn test_locker_command_wire_line() {
        assert_eq!(LockerCommand::Open1.wire_line(), "L1\n");
        assert_eq!(LockerCommand::Open2.wire_line(), "L2\n");
        assert_eq!(LockerCommand::Open3.wire_line(), "L3\n");
        assert_eq!(LockerCommand::OpenAll.wire_line(), "ALL\n");
    }

    #[test]
    fn test_security_level_parse() {
        assert_eq!("LOW".parse::<SecurityLevel>().unwrap(), SecurityLevel::Low);
        assert_eq!("HIGH".parse::<SecurityLevel>().unwrap(), SecurityLevel::High);
        assert!("low".parse::<SecurityLevel>().is_err());
        assert!("MEDIUM".parse::<SecurityLevel>().is_err());

        assert!(SecurityLevel::High.requires_confirmation());
        assert!(!SecurityLevel::Low.requires_confirmation());
    }

    #[test]
    fn test_security_level_serialization() {
        let json = serde_json::to_string(&SecurityLevel::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let parsed: SecurityLevel = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(parsed, SecurityLevel::Low);
    }

    #[test]
    fn test_access_event_for_credential() {
        let credential = Credential::new("ABC123", "Alice", 1, SecurityLevel::Low);
        let now = Utc::now();
        let event = AccessEvent::for_credential(&credential, now);

        assert_eq!(event.owner_name, "Alice");
        assert_eq!(event.locker_num, 1);
        assert_eq!(event.security_level, SecurityLevel::Low);
        assert_eq!(event.qr_code, "ABC123");
        assert_eq!(event.logged_at, now);
    }
}
