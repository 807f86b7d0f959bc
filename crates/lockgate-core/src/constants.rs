//! Core constants for the locker gate.
//!
//! Wire strings sent to the locker controller, pipeline timing defaults and
//! the literal accepted by the high-security confirmation prompt.
//!
//! # Actuator Wire Format
//!
//! Every command is a single ASCII line terminated by `\n`:
//!
//! | Locker number | Command | Bytes on the wire |
//! |---------------|---------|-------------------|
//! | `0` | open all | `ALL\n` |
//! | `1` | open locker 1 | `L1\n` |
//! | `2` | open locker 2 | `L2\n` |
//! | `3` | open locker 3 | `L3\n` |
//!
//! ```
//! use lockgate_core::constants::*;
//!
//! assert_eq!(format!("{CMD_OPEN_1}{COMMAND_TERMINATOR}"), "L1\n");
//! assert_eq!(LOCKER_ALL, 0);
//! ```

use std::time::Duration;

// ============================================================================
// Actuator Commands
// ============================================================================

/// Command opening locker 1.
pub const CMD_OPEN_1: &str = "L1";

/// Command opening locker 2.
pub const CMD_OPEN_2: &str = "L2";

/// Command opening locker 3.
pub const CMD_OPEN_3: &str = "L3";

/// Command opening every locker at once.
pub const CMD_OPEN_ALL: &str = "ALL";

/// Line terminator appended to every actuator command.
pub const COMMAND_TERMINATOR: char = '\n';

/// Locker number reserved for the "open all" command.
pub const LOCKER_ALL: i64 = 0;

// ============================================================================
// Pipeline Timing
// ============================================================================

/// Window during which an identical repeated scan is suppressed.
///
/// Keyboard-wedge scanners frequently report one physical scan as two reads
/// in quick succession.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Delay after opening the serial link before the first write.
///
/// Arduino-class controllers reset when the port is opened and ignore input
/// until their bootloader hands over.
pub const DEFAULT_ACTUATOR_SETTLE: Duration = Duration::from_millis(2000);

/// Default serial baud rate of the locker controller.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// ============================================================================
// Confirmation
// ============================================================================

/// Literal that authorizes a high-security open (compared case-insensitively
/// after trimming).
pub const CONFIRM_KEYWORD: &str = "CONFIRM";

/// Prompt shown on the operator console for high-security credentials.
pub const CONFIRM_PROMPT: &str = "Enter CONFIRM to open: ";

// ============================================================================
// Security Levels
// ============================================================================

/// Stored representation of the low security tier.
pub const SEC_LVL_LOW: &str = "LOW";

/// Stored representation of the high security tier.
pub const SEC_LVL_HIGH: &str = "HIGH";
