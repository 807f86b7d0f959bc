//! Mock actuator link for testing and development.

use crate::{Result, traits::ActuatorLink, types::DeviceInfo};
use tokio::sync::mpsc;
use tracing::info;

/// Mock actuator recording every line written to it.
///
/// Written lines are forwarded to the paired [`MockActuatorHandle`]. A failing
/// actuator rejects every write with a communication error, which is how a
/// dropped serial link presents itself. A discarding actuator has no handle:
/// it logs each line and keeps nothing.
///
/// # Examples
///
/// ```
/// use lockgate_hardware::mock::MockActuator;
/// use lockgate_hardware::traits::ActuatorLink;
///
/// #[tokio::main]
/// async fn main() -> lockgate_hardware::Result<()> {
///     let (mut actuator, mut handle) = MockActuator::new();
///
///     actuator.send_line("L1\n").await?;
///
///     assert_eq!(handle.sent_lines(), vec!["L1\n".to_string()]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockActuator {
    line_tx: Option<mpsc::UnboundedSender<String>>,
    name: String,
    fail_writes: bool,
}

impl MockActuator {
    /// Create a new mock actuator.
    pub fn new() -> (Self, MockActuatorHandle) {
        let (line_tx, line_rx) = mpsc::unbounded_channel();

        let actuator = Self {
            line_tx: Some(line_tx),
            name: "Mock Actuator".to_string(),
            fail_writes: false,
        };

        (actuator, MockActuatorHandle { line_rx })
    }

    /// Create a mock actuator whose writes always fail.
    pub fn failing() -> (Self, MockActuatorHandle) {
        let (mut actuator, handle) = Self::new();
        actuator.fail_writes = true;
        (actuator, handle)
    }

    /// Create a mock actuator that logs lines and drops them.
    pub fn discarding() -> Self {
        Self {
            line_tx: None,
            name: "Dry-run Actuator".to_string(),
            fail_writes: false,
        }
    }
}

impl ActuatorLink for MockActuator {
    async fn send_line(&mut self, line: &str) -> Result<()> {
        if self.fail_writes {
            return Err(crate::HardwareError::communication("Mock write failure"));
        }

        match &self.line_tx {
            Some(tx) => tx
                .send(line.to_string())
                .map_err(|_| crate::HardwareError::disconnected("Actuator handle dropped")),
            None => {
                info!(line = line.trim_end(), "dry run, line not sent");
                Ok(())
            }
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Actuator v1.0"))
    }
}

/// Handle observing a mock actuator.
#[derive(Debug)]
pub struct MockActuatorHandle {
    line_rx: mpsc::UnboundedReceiver<String>,
}

impl MockActuatorHandle {
    /// Drain every line written since the last call.
    pub fn sent_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.line_rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}
