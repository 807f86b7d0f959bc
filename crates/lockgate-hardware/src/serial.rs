//! Serial actuator link.
//!
//! The locker controller is an Arduino-class board on a USB serial adapter.
//! Commands are plain ASCII lines; the board never answers.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::ActuatorLink;
use crate::types::DeviceInfo;

/// Port timeout applied to the underlying serial device.
const SERIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Actuator link over a serial port.
#[derive(Debug)]
pub struct SerialActuator {
    port: SerialStream,
    path: String,
    baud_rate: u32,
}

impl SerialActuator {
    /// Open the serial port and wait `settle` before returning.
    ///
    /// Opening the port resets most Arduino boards, so writes issued during
    /// the bootloader window would be lost.
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the port cannot be opened.
    pub async fn open(path: &str, baud_rate: u32, settle: Duration) -> Result<Self> {
        let port = tokio_serial::new(path, baud_rate)
            .timeout(SERIAL_TIMEOUT)
            .open_native_async()?;

        if !settle.is_zero() {
            debug!(settle_ms = settle.as_millis() as u64, "waiting for controller reset");
            tokio::time::sleep(settle).await;
        }

        info!(path = %path, baud = baud_rate, "actuator link ready");

        Ok(Self {
            port,
            path: path.to_string(),
            baud_rate,
        })
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl ActuatorLink for SerialActuator {
    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.port.write_all(line.as_bytes()).await?;
        self.port.flush().await?;
        debug!(path = %self.path, bytes = line.len(), "line written");
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Locker controller", format!("serial {} baud", self.baud_rate))
            .with_path(self.path.clone()))
    }
}
