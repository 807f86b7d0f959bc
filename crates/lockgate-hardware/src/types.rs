//! Common types shared across hardware device implementations.
//!
//! This module defines the key event model produced by the scanner, the key
//! table used to turn key codes into characters, and generic device metadata.

use serde::{Deserialize, Serialize};

/// Generic device information.
///
/// Contains metadata about a hardware device such as name, model,
/// and the path it was opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "TMC HIDKeyBoard", "Mock Scanner").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional device path (e.g., "/dev/ttyUSB0").
    pub path: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            path: None,
        }
    }

    /// Set the device path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Key identifier reported by a keyboard-emulating scanner.
///
/// Only the keys a QR scanner actually types are modeled explicitly; every
/// other key is carried as [`KeyCode::Other`] with its raw code so it can be
/// ignored without losing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Letter key, stored lowercase (`'a'..='z'`).
    Letter(char),

    /// Digit key on the main row (`'0'..='9'`).
    Digit(char),

    /// Main Enter key (terminates a scan).
    Enter,

    LeftShift,

    RightShift,

    /// Any other key, with its raw evdev code.
    Other(u16),
}

/// Linux evdev codes for the letter and digit keys (`input-event-codes.h`).
const KEY_TABLE: [(u16, char); 36] = [
    (2, '1'),
    (3, '2'),
    (4, '3'),
    (5, '4'),
    (6, '5'),
    (7, '6'),
    (8, '7'),
    (9, '8'),
    (10, '9'),
    (11, '0'),
    (16, 'q'),
    (17, 'w'),
    (18, 'e'),
    (19, 'r'),
    (20, 't'),
    (21, 'y'),
    (22, 'u'),
    (23, 'i'),
    (24, 'o'),
    (25, 'p'),
    (30, 'a'),
    (31, 's'),
    (32, 'd'),
    (33, 'f'),
    (34, 'g'),
    (35, 'h'),
    (36, 'j'),
    (37, 'k'),
    (38, 'l'),
    (44, 'z'),
    (45, 'x'),
    (46, 'c'),
    (47, 'v'),
    (48, 'b'),
    (49, 'n'),
    (50, 'm'),
];

const EVDEV_KEY_ENTER: u16 = 28;
const EVDEV_KEY_LEFTSHIFT: u16 = 42;
const EVDEV_KEY_RIGHTSHIFT: u16 = 54;

impl KeyCode {
    /// Letter key for `c`, if `c` is an ASCII letter.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self::Letter(c.to_ascii_lowercase()))
    }

    /// Digit key for `c`, if `c` is an ASCII digit.
    pub fn digit(c: char) -> Option<Self> {
        c.is_ascii_digit().then_some(Self::Digit(c))
    }

    /// Translate a raw evdev key code.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockgate_hardware::types::KeyCode;
    ///
    /// assert_eq!(KeyCode::from_evdev(30), KeyCode::Letter('a'));
    /// assert_eq!(KeyCode::from_evdev(11), KeyCode::Digit('0'));
    /// assert_eq!(KeyCode::from_evdev(28), KeyCode::Enter);
    /// assert_eq!(KeyCode::from_evdev(96), KeyCode::Other(96));
    /// ```
    pub fn from_evdev(code: u16) -> Self {
        match code {
            EVDEV_KEY_ENTER => Self::Enter,
            EVDEV_KEY_LEFTSHIFT => Self::LeftShift,
            EVDEV_KEY_RIGHTSHIFT => Self::RightShift,
            _ => KEY_TABLE
                .iter()
                .find(|(c, _)| *c == code)
                .map(|&(_, ch)| {
                    if ch.is_ascii_digit() {
                        Self::Digit(ch)
                    } else {
                        Self::Letter(ch)
                    }
                })
                .unwrap_or(Self::Other(code)),
        }
    }

    /// Returns `true` for either shift key.
    pub fn is_shift(&self) -> bool {
        matches!(self, Self::LeftShift | Self::RightShift)
    }

    /// Character this key types under the given shift state.
    ///
    /// Letters follow the shift state, digits pass through unchanged and every
    /// other key types nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockgate_hardware::types::KeyCode;
    ///
    /// assert_eq!(KeyCode::Letter('q').to_char(true), Some('Q'));
    /// assert_eq!(KeyCode::Letter('q').to_char(false), Some('q'));
    /// assert_eq!(KeyCode::Digit('7').to_char(true), Some('7'));
    /// assert_eq!(KeyCode::Enter.to_char(false), None);
    /// ```
    pub fn to_char(&self, shift_pressed: bool) -> Option<char> {
        match *self {
            Self::Letter(c) if shift_pressed => Some(c.to_ascii_uppercase()),
            Self::Letter(c) => Some(c),
            Self::Digit(d) => Some(d),
            _ => None,
        }
    }
}

/// A single key press or release from the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKeyEvent {
    pub key: KeyCode,
    pub is_key_down: bool,
}

impl RawKeyEvent {
    /// Key-down event.
    pub fn down(key: KeyCode) -> Self {
        Self {
            key,
            is_key_down: true,
        }
    }

    /// Key-up event.
    pub fn up(key: KeyCode) -> Self {
        Self {
            key,
            is_key_down: false,
        }
    }

    /// Events a keyboard-wedge scanner emits while typing `text` and pressing Enter.
    ///
    /// Uppercase letters are wrapped in a left-shift press/release. Characters
    /// that have no key in the table are skipped.
    pub fn sequence_for(text: &str) -> Vec<Self> {
        let mut events = Vec::with_capacity(text.len() * 2 + 2);

        for c in text.chars() {
            let Some(key) = KeyCode::letter(c).or_else(|| KeyCode::digit(c)) else {
                continue;
            };
            let shifted = c.is_ascii_uppercase();

            if shifted {
                events.push(Self::down(KeyCode::LeftShift));
            }
            events.push(Self::down(key));
            events.push(Self::up(key));
            if shifted {
                events.push(Self::up(KeyCode::LeftShift));
            }
        }

        events.push(Self::down(KeyCode::Enter));
        events.push(Self::up(KeyCode::Enter));
        events
    }
}
