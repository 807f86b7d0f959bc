//! Mock QR scanner for testing and development.
//!
//! This module provides a simulated keyboard-wedge scanner that can be fed
//! key events programmatically, without a physical device.

use crate::{
    Result,
    traits::ScannerDevice,
    types::{DeviceInfo, RawKeyEvent},
};
use tokio::sync::mpsc;

/// Mock scanner device.
///
/// Key events sent through a [`MockScannerHandle`] are returned by
/// [`ScannerDevice::read_event`] in order. Dropping every handle closes the
/// device, which then reports a disconnect.
///
/// # Examples
///
/// ```
/// use lockgate_hardware::mock::MockScanner;
/// use lockgate_hardware::traits::ScannerDevice;
/// use lockgate_hardware::types::{KeyCode, RawKeyEvent};
///
/// #[tokio::main]
/// async fn main() -> lockgate_hardware::Result<()> {
///     let (mut scanner, handle) = MockScanner::new();
///
///     handle.scan("a1").await?;
///
///     assert_eq!(scanner.read_event().await?, RawKeyEvent::down(KeyCode::Letter('a')));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockScanner {
    /// Channel receiver for simulated key events
    event_rx: mpsc::Receiver<RawKeyEvent>,

    /// Device name
    name: String,
}

impl MockScanner {
    /// Create a new mock scanner with the default name.
    pub fn new() -> (Self, MockScannerHandle) {
        Self::with_name("Mock Scanner".to_string())
    }

    /// Create a new mock scanner with a custom name.
    pub fn with_name(name: String) -> (Self, MockScannerHandle) {
        let (event_tx, event_rx) = mpsc::channel(256);

        let scanner = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockScannerHandle { event_tx, name };

        (scanner, handle)
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new().0
    }
}

impl ScannerDevice for MockScanner {
    async fn read_event(&mut self) -> Result<RawKeyEvent> {
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| crate::HardwareError::disconnected("Scanner event channel closed"))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Scanner v1.0"))
    }
}

/// Handle for feeding a mock scanner.
///
/// The handle can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    /// Channel sender for simulated key events
    event_tx: mpsc::Sender<RawKeyEvent>,

    /// Device name
    name: String,
}

impl MockScannerHandle {
    /// Send a single key event.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner has been dropped.
    pub async fn send_event(&self, event: RawKeyEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Scanner event channel closed"))
    }

    /// Send a sequence of key events.
    pub async fn send_events(&self, events: &[RawKeyEvent]) -> Result<()> {
        for &event in events {
            self.send_event(event).await?;
        }
        Ok(())
    }

    /// Type `text` the way a scanner does, followed by Enter.
    ///
    /// Uppercase letters are sent with left shift held.
    pub async fn scan(&self, text: &str) -> Result<()> {
        self.send_events(&RawKeyEvent::sequence_for(text)).await
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
