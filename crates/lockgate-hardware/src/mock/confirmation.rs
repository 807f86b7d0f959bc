//! Mock confirmation channel for testing and development.

use crate::{Result, traits::ConfirmationChannel};
use tokio::sync::mpsc;

/// Mock operator console.
///
/// Responses queued through the [`MockConfirmationHandle`] answer prompts in
/// order. Every prompt shown is reported back to the handle, so tests can
/// assert whether a confirmation was requested at all. When every handle is
/// dropped and the queue is empty, the channel reports closed (`Ok(None)`).
///
/// # Examples
///
/// ```
/// use lockgate_hardware::mock::MockConfirmation;
/// use lockgate_hardware::traits::ConfirmationChannel;
///
/// #[tokio::main]
/// async fn main() -> lockgate_hardware::Result<()> {
///     let (mut console, mut handle) = MockConfirmation::new();
///
///     handle.respond("CONFIRM").await?;
///     let answer = console.request_confirmation("Enter CONFIRM to open: ").await?;
///
///     assert_eq!(answer.as_deref(), Some("CONFIRM"));
///     assert_eq!(handle.prompt_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockConfirmation {
    response_rx: mpsc::Receiver<String>,
    prompt_tx: mpsc::UnboundedSender<String>,
}

impl MockConfirmation {
    pub fn new() -> (Self, MockConfirmationHandle) {
        let (response_tx, response_rx) = mpsc::channel(32);
        let (prompt_tx, prompt_rx) = mpsc::unbounded_channel();

        let console = Self {
            response_rx,
            prompt_tx,
        };

        let handle = MockConfirmationHandle {
            response_tx,
            prompt_rx,
        };

        (console, handle)
    }
}

impl ConfirmationChannel for MockConfirmation {
    async fn request_confirmation(&mut self, prompt: &str) -> Result<Option<String>> {
        // The handle may already be gone; prompts are informational only.
        let _ = self.prompt_tx.send(prompt.to_string());
        Ok(self.response_rx.recv().await)
    }
}

/// Handle scripting a mock confirmation channel.
#[derive(Debug)]
pub struct MockConfirmationHandle {
    response_tx: mpsc::Sender<String>,
    prompt_rx: mpsc::UnboundedReceiver<String>,
}

impl MockConfirmationHandle {
    /// Queue an operator response.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel has been dropped.
    pub async fn respond(&self, response: impl Into<String>) -> Result<()> {
        self.response_tx
            .send(response.into())
            .await
            .map_err(|_| crate::HardwareError::disconnected("Confirmation channel closed"))
    }

    /// Number of prompts shown since the last call.
    pub fn prompt_count(&mut self) -> usize {
        let mut count = 0;
        while self.prompt_rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_confirmation_answers_in_order() {
        let (mut console, mut handle) = MockConfirmation::new();

        handle.respond("yes").await.unwrap();
        handle.respond("confirm").await.unwrap();

        assert_eq!(
            console.request_confirmation("?").await.unwrap().as_deref(),
            Some("yes")
        );
        assert_eq!(
            console.request_confirmation("?").await.unwrap().as_deref(),
            Some("confirm")
        );
        assert_eq!(handle.prompt_count(), 2);
        assert_eq!(handle.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_confirmation_closed() {
        let (mut console, handle) = MockConfirmation::new();
        drop(handle);

        assert_eq!(console.request_confirmation("?").await.unwrap(), None);
    }
}
