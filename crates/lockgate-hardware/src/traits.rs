//! Hardware device trait definitions.
//!
//! This module defines the seams between the scan pipeline and the outside
//! world: the QR scanner that produces key events, the actuator link that
//! receives locker commands, and the human channel that answers confirmation
//! prompts. The pipeline is generic over these traits so mock and real
//! devices are interchangeable.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, RawKeyEvent};

/// Keyboard-emulating QR scanner.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrappers from the
/// [`devices`](crate::devices) module when the device is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use lockgate_hardware::traits::ScannerDevice;
/// use lockgate_hardware::types::KeyCode;
/// use lockgate_hardware::error::Result;
///
/// async fn wait_for_enter<S: ScannerDevice>(scanner: &mut S) -> Result<()> {
///     loop {
///         let event = scanner.read_event().await?;
///         if event.is_key_down && event.key == KeyCode::Enter {
///             return Ok(());
///         }
///     }
/// }
/// ```
pub trait ScannerDevice: Send + Sync {
    /// Read the next key event from the scanner.
    ///
    /// Blocks asynchronously until the device reports a key press or release.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected or closed
    /// - A read error occurs
    async fn read_event(&mut self) -> Result<RawKeyEvent>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Outbound link to the locker controller.
///
/// Implementations write each line exactly once and never read an
/// acknowledgment back. Write failures must be reported, never retried
/// silently.
pub trait ActuatorLink: Send + Sync {
    /// Write one complete line (terminator included) to the controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects or fails the write.
    async fn send_line(&mut self, line: &str) -> Result<()>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Human-interaction channel used for high-security confirmations.
pub trait ConfirmationChannel: Send + Sync {
    /// Show `prompt` and wait for one line of operator input.
    ///
    /// Returns `Ok(None)` if the channel closed before a line arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the channel fails.
    async fn request_confirmation(&mut self, prompt: &str) -> Result<Option<String>>;
}
