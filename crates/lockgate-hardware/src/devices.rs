//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) is not object-safe, so
//! `Box<dyn ScannerDevice>` is not available. These enums give concrete type
//! dispatch when the device kind is only known at runtime (real hardware vs.
//! mock), at zero cost for callers that stay generic.
//!
//! # Examples
//!
//! ```
//! use lockgate_hardware::devices::AnyActuatorLink;
//! use lockgate_hardware::mock::MockActuator;
//!
//! let (actuator, _handle) = MockActuator::new();
//! let any_actuator = AnyActuatorLink::Mock(actuator);
//! ```

use crate::console::ConsoleConfirmation;
use crate::evdev::EvdevScanner;
use crate::mock::{MockActuator, MockConfirmation, MockScanner};
use crate::serial::SerialActuator;
use crate::traits::{ActuatorLink, ConfirmationChannel, ScannerDevice};
use crate::{DeviceInfo, RawKeyEvent, Result};

/// Enum wrapper for scanner dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    /// Linux evdev input device.
    Evdev(EvdevScanner),
    /// Mock scanner for development and testing.
    Mock(MockScanner),
}

impl ScannerDevice for AnyScannerDevice {
    async fn read_event(&mut self) -> Result<RawKeyEvent> {
        match self {
            Self::Evdev(device) => device.read_event().await,
            Self::Mock(device) => device.read_event().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Evdev(device) => device.get_info().await,
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for actuator link dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyActuatorLink {
    /// Serial port to the locker controller.
    Serial(SerialActuator),
    /// Mock actuator for development and testing.
    Mock(MockActuator),
}

impl ActuatorLink for AnyActuatorLink {
    async fn send_line(&mut self, line: &str) -> Result<()> {
        match self {
            Self::Serial(device) => device.send_line(line).await,
            Self::Mock(device) => device.send_line(line).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Serial(device) => device.get_info().await,
            Self::Mock(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for confirmation channel dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyConfirmationChannel {
    /// Operator console on stdin/stdout.
    Console(ConsoleConfirmation),
    /// Mock channel for development and testing.
    Mock(MockConfirmation),
}

impl ConfirmationChannel for AnyConfirmationChannel {
    async fn request_confirmation(&mut self, prompt: &str) -> Result<Option<String>> {
        match self {
            Self::Console(channel) => channel.request_confirmation(prompt).await,
            Self::Mock(channel) => channel.request_confirmation(prompt).await,
        }
    }
}
