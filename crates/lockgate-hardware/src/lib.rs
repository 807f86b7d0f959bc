//! Hardware device abstraction layer for the locker gate.
//!
//! This crate provides trait-based abstractions for the three peripherals
//! the scan pipeline talks to, real implementations for each, and mock
//! implementations for development and testing without physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with detailed error information.
//!
//! # Device Traits
//!
//! ## QR Scanner
//!
//! The [`ScannerDevice`] trait yields raw key events from a keyboard-emulating
//! scanner. [`EvdevScanner`] reads them from a Linux input device:
//!
//! ```no_run
//! use lockgate_hardware::evdev::EvdevScanner;
//! use lockgate_hardware::traits::ScannerDevice;
//!
//! # async fn example() -> lockgate_hardware::Result<()> {
//! let mut scanner = EvdevScanner::open("/dev/input/event3").await?;
//! let event = scanner.read_event().await?;
//! println!("{:?} down={}", event.key, event.is_key_down);
//! # Ok(())
//! # }
//! ```
//!
//! ## Actuator Link
//!
//! The [`ActuatorLink`] trait writes command lines to the locker controller.
//! [`SerialActuator`] does so over a serial port:
//!
//! ```no_run
//! use lockgate_hardware::serial::SerialActuator;
//! use lockgate_hardware::traits::ActuatorLink;
//! use std::time::Duration;
//!
//! # async fn example() -> lockgate_hardware::Result<()> {
//! let mut link = SerialActuator::open("/dev/ttyUSB0", 9600, Duration::from_secs(2)).await?;
//! link.send_line("L1\n").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Confirmation Channel
//!
//! The [`ConfirmationChannel`] trait asks a human for one line of input.
//! [`ConsoleConfirmation`] uses the process console.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.
//!
//! [`ScannerDevice`]: traits::ScannerDevice
//! [`ActuatorLink`]: traits::ActuatorLink
//! [`ConfirmationChannel`]: traits::ConfirmationChannel
//! [`EvdevScanner`]: evdev::EvdevScanner
//! [`SerialActuator`]: serial::SerialActuator
//! [`ConsoleConfirmation`]: console::ConsoleConfirmation

pub mod console;
pub mod devices;
pub mod error;
pub mod evdev;
pub mod mock;
pub mod serial;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyActuatorLink, AnyConfirmationChannel, AnyScannerDevice};
pub use error::{HardwareError, Result};
pub use traits::{ActuatorLink, ConfirmationChannel, ScannerDevice};
pub use types::{DeviceInfo, KeyCode, RawKeyEvent};
