//! Operator console confirmation channel.
//!
//! Lines are read by a background reader for the whole life of the channel
//! and queued. A request drops whatever was queued before its prompt, so an
//! answer typed for an earlier prompt (or after it timed out) never confirms
//! a later one. Waiting on the queue is cancellation safe.

use std::io::BufRead;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::ConfirmationChannel;

/// Confirmation channel fed by a line reader.
///
/// Input that is not valid UTF-8 is decoded lossily, so it simply fails to
/// match the confirmation keyword.
#[derive(Debug)]
pub struct ConsoleConfirmation<W = Stdout> {
    lines: mpsc::UnboundedReceiver<String>,
    writer: W,
}

impl ConsoleConfirmation {
    /// Console bound to the process's stdin and stdout.
    ///
    /// Stdin is read on a detached OS thread: a read blocked on the terminal
    /// never keeps the runtime from shutting down.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the reader thread cannot be spawned.
    pub fn stdio() -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("lockgate-console".to_string())
            .spawn(move || {
                let mut stdin = std::io::stdin().lock();
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match stdin.read_until(b'\n', &mut buf) {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "console read failed, closing confirmation channel");
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            lines: rx,
            writer: tokio::io::stdout(),
        })
    }
}

impl<W> ConsoleConfirmation<W>
where
    W: AsyncWrite + Unpin + Send + Sync,
{
    /// Console reading from any async line source.
    ///
    /// Spawns the reader on the current tokio runtime.
    pub fn from_reader<R>(reader: R, writer: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_lines(reader, tx));
        Self { lines: rx, writer }
    }

    /// Consume the channel, returning the writer (useful to inspect prompts).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

async fn forward_lines<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "console read failed, closing confirmation channel");
                break;
            }
        }
    }
}

impl<W> ConfirmationChannel for ConsoleConfirmation<W>
where
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn request_confirmation(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stale = 0usize;
        while self.lines.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(discarded = stale, "dropped console input typed before the prompt");
        }

        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        Ok(self.lines.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, BufReader, DuplexStream, duplex};

    /// Console over duplex pipes; returns the operator's keyboard and screen.
    fn console() -> (ConsoleConfirmation<DuplexStream>, DuplexStream, DuplexStream) {
        let (keyboard, console_in) = duplex(64);
        let (console_out, screen) = duplex(64);
        let console = ConsoleConfirmation::from_reader(BufReader::new(console_in), console_out);
        (console, keyboard, screen)
    }

    async fn wait_for_prompt(screen: &mut DuplexStream, prompt: &str) {
        let mut shown = vec![0u8; prompt.len()];
        screen.read_exact(&mut shown).await.unwrap();
        assert_eq!(shown, prompt.as_bytes());
    }

    #[tokio::test]
    async fn test_console_reads_one_line_per_prompt() {
        let (mut console, mut keyboard, mut screen) = console();

        let operator = tokio::spawn(async move {
            wait_for_prompt(&mut screen, "> ").await;
            keyboard.write_all(b"confirm\n").await.unwrap();
            wait_for_prompt(&mut screen, "> ").await;
            keyboard.write_all(b"no\n").await.unwrap();
            (keyboard, screen)
        });

        let first = console.request_confirmation("> ").await.unwrap();
        let second = console.request_confirmation("> ").await.unwrap();
        operator.await.unwrap();

        assert_eq!(first.as_deref(), Some("confirm\n"));
        assert_eq!(second.as_deref(), Some("no\n"));
    }

    #[tokio::test]
    async fn test_console_eof_is_none() {
        let (mut console, keyboard, _screen) = console();
        drop(keyboard);
        assert_eq!(console.request_confirmation("> ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_input_typed_before_prompt_is_discarded() {
        let (mut console, mut keyboard, mut screen) = console();

        keyboard.write_all(b"CONFIRM\n").await.unwrap();
        // Let the reader queue the early line.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let operator = tokio::spawn(async move {
            wait_for_prompt(&mut screen, "> ").await;
            keyboard.write_all(b"late answer\n").await.unwrap();
            keyboard
        });

        let answer = console.request_confirmation("> ").await.unwrap();
        let _keyboard = operator.await.unwrap();
        assert_eq!(answer.as_deref(), Some("late answer\n"));
    }

    #[tokio::test]
    async fn test_dropped_request_leaves_no_pending_read() {
        let (mut console, mut keyboard, mut screen) = console();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), console.request_confirmation("> "))
                .await;
        assert!(abandoned.is_err());
        wait_for_prompt(&mut screen, "> ").await;

        // Answer meant for the abandoned prompt.
        keyboard.write_all(b"CONFIRM\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let next =
            tokio::time::timeout(Duration::from_millis(20), console.request_confirmation("> "))
                .await;
        assert!(next.is_err(), "late answer must not satisfy a new prompt");
    }

    #[tokio::test]
    async fn test_non_utf8_input_is_decoded_lossily() {
        let (mut console, mut keyboard, mut screen) = console();

        let operator = tokio::spawn(async move {
            wait_for_prompt(&mut screen, "> ").await;
            keyboard.write_all(b"\xff\xfe\n").await.unwrap();
            keyboard
        });

        let answer = console.request_confirmation("> ").await.unwrap();
        let _keyboard = operator.await.unwrap();
        assert_eq!(answer.as_deref(), Some("\u{fffd}\u{fffd}\n"));
    }
}
