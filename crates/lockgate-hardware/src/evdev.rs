//! Linux evdev scanner.
//!
//! Keyboard-wedge QR scanners show up as an input device under
//! `/dev/input`. Reading the character device yields a stream of fixed-size
//! `struct input_event` records:
//!
//! ```text
//! struct input_event {
//!     struct timeval time;   // 16 bytes on 64-bit targets, 8 on 32-bit
//!     __u16 type;
//!     __u16 code;
//!     __s32 value;           // 0 = release, 1 = press, 2 = autorepeat
//! };
//! ```
//!
//! Only `EV_KEY` records with a press or release value are surfaced; sync,
//! scan-code and autorepeat records are skipped.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::error::{HardwareError, Result};
use crate::traits::ScannerDevice;
use crate::types::{DeviceInfo, KeyCode, RawKeyEvent};

/// Event type for key presses and releases.
pub const EV_KEY: u16 = 0x01;

#[cfg(target_pointer_width = "64")]
const TIMEVAL_SIZE: usize = 16;

#[cfg(not(target_pointer_width = "64"))]
const TIMEVAL_SIZE: usize = 8;

/// Size in bytes of one `struct input_event` on this target.
pub const INPUT_EVENT_SIZE: usize = TIMEVAL_SIZE + 8;

const KEY_RELEASED: i32 = 0;
const KEY_PRESSED: i32 = 1;

/// Decode one raw `input_event` record.
///
/// Returns `None` for records that are not key presses or releases.
pub fn decode_input_event(frame: &[u8; INPUT_EVENT_SIZE]) -> Option<RawKeyEvent> {
    let ev_type = u16::from_ne_bytes([frame[TIMEVAL_SIZE], frame[TIMEVAL_SIZE + 1]]);
    let code = u16::from_ne_bytes([frame[TIMEVAL_SIZE + 2], frame[TIMEVAL_SIZE + 3]]);
    let value = i32::from_ne_bytes([
        frame[TIMEVAL_SIZE + 4],
        frame[TIMEVAL_SIZE + 5],
        frame[TIMEVAL_SIZE + 6],
        frame[TIMEVAL_SIZE + 7],
    ]);

    if ev_type != EV_KEY {
        return None;
    }

    let key = KeyCode::from_evdev(code);
    match value {
        KEY_PRESSED => Some(RawKeyEvent::down(key)),
        KEY_RELEASED => Some(RawKeyEvent::up(key)),
        _ => None,
    }
}

/// Scanner backed by an evdev character device.
///
/// The reader is generic so tests can feed recorded event streams.
#[derive(Debug)]
pub struct EvdevScanner<R = tokio::fs::File> {
    reader: R,
    path: String,
    name: String,
}

impl EvdevScanner<tokio::fs::File> {
    /// Open the input device at `path`.
    ///
    /// The device name is read from sysfs when available, falling back to
    /// the path itself.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the device cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            HardwareError::initialization_failed(format!(
                "cannot open scanner {}: {e}",
                path.display()
            ))
        })?;

        let name = sysfs_device_name(path)
            .await
            .unwrap_or_else(|| path.display().to_string());
        debug!(path = %path.display(), name = %name, "scanner opened");

        Ok(Self {
            reader: file,
            path: path.display().to_string(),
            name,
        })
    }
}

impl<R> EvdevScanner<R>
where
    R: AsyncRead + Unpin + Send + Sync,
{
    /// Wrap an existing event stream.
    pub fn from_reader(reader: R, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            reader,
            name: path.clone(),
            path,
        }
    }
}

impl<R> ScannerDevice for EvdevScanner<R>
where
    R: AsyncRead + Unpin + Send + Sync,
{
    async fn read_event(&mut self) -> Result<RawKeyEvent> {
        loop {
            let mut frame = [0u8; INPUT_EVENT_SIZE];
            match self.reader.read_exact(&mut frame).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(HardwareError::disconnected(self.path.clone()));
                }
                Err(e) => return Err(e.into()),
            }

            if let Some(event) = decode_input_event(&frame) {
                trace!(?event, "key event");
                return Ok(event);
            }
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "evdev").with_path(self.path.clone()))
    }
}

/// Look up `/sys/class/input/<eventN>/device/name` for a device node.
async fn sysfs_device_name(path: &Path) -> Option<String> {
    let resolved = tokio::fs::canonicalize(path).await.ok()?;
    let node = resolved.file_name()?.to_str()?.to_string();
    let name = tokio::fs::read_to_string(format!("/sys/class/input/{node}/device/name"))
        .await
        .ok()?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame(ev_type: u16, code: u16, value: i32) -> [u8; INPUT_EVENT_SIZE] {
        let mut frame = [0u8; INPUT_EVENT_SIZE];
        frame[TIMEVAL_SIZE..TIMEVAL_SIZE + 2].copy_from_slice(&ev_type.to_ne_bytes());
        frame[TIMEVAL_SIZE + 2..TIMEVAL_SIZE + 4].copy_from_slice(&code.to_ne_bytes());
        frame[TIMEVAL_SIZE + 4..].copy_from_slice(&value.to_ne_bytes());
        frame
    }

    #[test]
    fn test_decode_key_press_and_release() {
        assert_eq!(
            decode_input_event(&frame(EV_KEY, 30, 1)),
            Some(RawKeyEvent::down(KeyCode::Letter('a')))
        );
        assert_eq!(
            decode_input_event(&frame(EV_KEY, 28, 0)),
            Some(RawKeyEvent::up(KeyCode::Enter))
        );
    }

    #[test]
    fn test_decode_skips_autorepeat_and_other_types() {
        // autorepeat
        assert_eq!(decode_input_event(&frame(EV_KEY, 30, 2)), None);
        // EV_SYN
        assert_eq!(decode_input_event(&frame(0x00, 0, 0)), None);
        // EV_MSC scan code
        assert_eq!(decode_input_event(&frame(0x04, 4, 458756)), None);
    }

    #[tokio::test]
    async fn test_scanner_reads_key_events_from_stream() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&frame(0x04, 4, 458756));
        bytes.extend_from_slice(&frame(EV_KEY, 42, 1));
        bytes.extend_from_slice(&frame(0x00, 0, 0));
        bytes.extend_from_slice(&frame(EV_KEY, 2, 1));

        let mut scanner = EvdevScanner::from_reader(Cursor::new(bytes), "/dev/input/test");

        assert_eq!(
            scanner.read_event().await.unwrap(),
            RawKeyEvent::down(KeyCode::LeftShift)
        );
        assert_eq!(
            scanner.read_event().await.unwrap(),
            RawKeyEvent::down(KeyCode::Digit('1'))
        );
    }

    #[tokio::test]
    async fn test_scanner_end_of_stream_is_disconnect() {
        let mut bytes = frame(EV_KEY, 30, 1).to_vec();
        // truncated trailing record
        bytes.extend_from_slice(&[0u8; 5]);

        let mut scanner = EvdevScanner::from_reader(Cursor::new(bytes), "/dev/input/test");
        scanner.read_event().await.unwrap();

        let err = scanner.read_event().await.unwrap_err();
        assert!(err.is_disconnect());
    }

    #[tokio::test]
    async fn test_scanner_info() {
        let scanner = EvdevScanner::from_reader(Cursor::new(Vec::new()), "/dev/input/event7");
        let info = scanner.get_info().await.unwrap();
        assert_eq!(info.model, "evdev");
        assert_eq!(info.path.as_deref(), Some("/dev/input/event7"));
    }
}
