//! Reassembly of scan tokens from raw key events.
//!
//! A keyboard-emulating scanner "types" its payload one key at a time and
//! finishes with Enter. [`KeyEventDecoder`] tracks the shift state, buffers
//! printable characters and yields one [`ScanToken`] per Enter press.

use lockgate_core::ScanToken;
use lockgate_hardware::{KeyCode, RawKeyEvent, Result, ScannerDevice};
use tracing::{debug, trace};

/// Turns a scanner's key stream into scan tokens.
///
/// # Examples
///
/// ```
/// use lockgate_hardware::mock::MockScanner;
/// use lockgate_pipeline::KeyEventDecoder;
///
/// #[tokio::main]
/// async fn main() -> lockgate_hardware::Result<()> {
///     let (scanner, handle) = MockScanner::new();
///     let mut decoder = KeyEventDecoder::new(scanner);
///
///     handle.scan("ABC123").await?;
///     assert_eq!(decoder.next_token().await?.as_str(), "ABC123");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct KeyEventDecoder<S> {
    scanner: S,
    shift_pressed: bool,
    buffer: String,
}

impl<S> KeyEventDecoder<S> {
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            shift_pressed: false,
            buffer: String::new(),
        }
    }

    /// The underlying scanner device.
    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Characters buffered since the last Enter.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn is_shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Apply one key event, returning a token when Enter completes one.
    ///
    /// Shift presses and releases toggle the shift state. Every other key-up
    /// is ignored. Enter with an empty buffer yields nothing.
    pub fn feed(&mut self, event: RawKeyEvent) -> Option<ScanToken> {
        if event.key.is_shift() {
            self.shift_pressed = event.is_key_down;
            return None;
        }

        if !event.is_key_down {
            return None;
        }

        if event.key == KeyCode::Enter {
            let raw = std::mem::take(&mut self.buffer);
            return ScanToken::new(&raw).ok();
        }

        match event.key.to_char(self.shift_pressed) {
            Some(c) => self.buffer.push(c),
            None => trace!(key = ?event.key, "Ignoring non-printable key"),
        }

        None
    }
}

impl<S: ScannerDevice> KeyEventDecoder<S> {
    /// Wait for the next complete token.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error unchanged. A disconnected scanner is
    /// reported as [`HardwareError::Disconnected`](lockgate_hardware::HardwareError::Disconnected)
    /// and should end the pipeline.
    pub async fn next_token(&mut self) -> Result<ScanToken> {
        loop {
            let event = self.scanner.read_event().await?;

            if let Some(token) = self.feed(event) {
                debug!(token = %token, "Scan token decoded");
                return Ok(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockgate_hardware::HardwareError;
    use lockgate_hardware::mock::MockScanner;
    use rstest::rstest;

    fn decoder() -> KeyEventDecoder<()> {
        KeyEventDecoder::new(())
    }

    fn feed_all(decoder: &mut KeyEventDecoder<()>, events: &[RawKeyEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|&e| decoder.feed(e))
            .map(ScanToken::into_inner)
            .collect()
    }

    #[rstest]
    #[case("ABC123")]
    #[case("abc123")]
    #[case("XyZ999")]
    #[case("0")]
    fn test_decodes_typed_text(#[case] text: &str) {
        let mut decoder = decoder();
        let tokens = feed_all(&mut decoder, &RawKeyEvent::sequence_for(text));
        assert_eq!(tokens, vec![text.to_string()]);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_right_shift_uppercases() {
        let a = KeyCode::Letter('a');
        let events = [
            RawKeyEvent::down(KeyCode::RightShift),
            RawKeyEvent::down(a),
            RawKeyEvent::up(a),
            RawKeyEvent::up(KeyCode::RightShift),
            RawKeyEvent::down(a),
            RawKeyEvent::down(KeyCode::Enter),
        ];

        assert_eq!(feed_all(&mut decoder(), &events), vec!["Aa".to_string()]);
    }

    #[test]
    fn test_shift_held_across_keys() {
        let events = [
            RawKeyEvent::down(KeyCode::LeftShift),
            RawKeyEvent::down(KeyCode::Letter('x')),
            RawKeyEvent::down(KeyCode::Digit('9')),
            RawKeyEvent::down(KeyCode::Letter('y')),
            RawKeyEvent::up(KeyCode::LeftShift),
            RawKeyEvent::down(KeyCode::Enter),
        ];

        assert_eq!(feed_all(&mut decoder(), &events), vec!["X9Y".to_string()]);
    }

    #[test]
    fn test_empty_enter_emits_nothing() {
        let mut decoder = decoder();
        let events = [
            RawKeyEvent::down(KeyCode::Enter),
            RawKeyEvent::up(KeyCode::Enter),
            RawKeyEvent::down(KeyCode::Enter),
        ];

        assert!(feed_all(&mut decoder, &events).is_empty());
    }

    #[test]
    fn test_other_keys_and_key_ups_ignored() {
        let mut decoder = decoder();
        let events = [
            RawKeyEvent::down(KeyCode::Other(57)),
            RawKeyEvent::up(KeyCode::Digit('1')),
            RawKeyEvent::down(KeyCode::Digit('1')),
            RawKeyEvent::down(KeyCode::Other(12)),
            RawKeyEvent::up(KeyCode::Enter),
        ];

        assert!(feed_all(&mut decoder, &events).is_empty());
        assert_eq!(decoder.pending(), "1");
    }

    #[test]
    fn test_buffer_cleared_between_tokens() {
        let mut decoder = decoder();
        let mut events = RawKeyEvent::sequence_for("ABC123");
        events.extend(RawKeyEvent::sequence_for("XYZ999"));

        assert_eq!(
            feed_all(&mut decoder, &events),
            vec!["ABC123".to_string(), "XYZ999".to_string()]
        );
    }

    #[tokio::test]
    async fn test_next_token_from_mock_scanner() {
        let (scanner, handle) = MockScanner::new();
        let mut decoder = KeyEventDecoder::new(scanner);

        handle.scan("NOPE000").await.unwrap();
        handle.scan("ABC123").await.unwrap();

        assert_eq!(decoder.next_token().await.unwrap().as_str(), "NOPE000");
        assert_eq!(decoder.next_token().await.unwrap().as_str(), "ABC123");
    }

    #[tokio::test]
    async fn test_next_token_reports_disconnect() {
        let (scanner, handle) = MockScanner::new();
        let mut decoder = KeyEventDecoder::new(scanner);

        handle
            .send_event(RawKeyEvent::down(KeyCode::Digit('4')))
            .await
            .unwrap();
        drop(handle);

        let err = decoder.next_token().await.unwrap_err();
        assert!(matches!(err, HardwareError::Disconnected { .. }));
        assert_eq!(decoder.pending(), "4");
    }
}
