//! Terminal input sources for the relay.
//!
//! Platforms that can wake a task when stdin becomes readable use
//! [`NotifiedInput`]; the others fall back to [`PolledInput`], which checks a
//! reader thread's queue on every poll tick. The choice is made once, by
//! [`InputMode::detect`].

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

use super::POLL_INTERVAL;

/// A line-oriented input stream forwarded to the child.
#[async_trait]
pub trait LineSource: Send {
    /// Next complete line, terminator included. `None` at end of input.
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// How the relay reads the user's keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Wait for the runtime to report stdin readable
    Notified,
    /// Check for a ready line every [`POLL_INTERVAL`]
    Polled,
    /// The child sees end of input right away
    Detached,
}

impl InputMode {
    /// Input mode best suited to the current platform.
    pub fn detect() -> Self {
        if cfg!(windows) {
            InputMode::Polled
        } else {
            InputMode::Notified
        }
    }

    /// Open the terminal input for this mode.
    pub fn open(self) -> io::Result<Box<dyn LineSource>> {
        Ok(match self {
            InputMode::Notified => Box::new(NotifiedInput::new()),
            InputMode::Polled => Box::new(PolledInput::spawn()?),
            InputMode::Detached => Box::new(DetachedInput),
        })
    }
}

/// Stdin read through the runtime; the task is woken when a line is ready.
pub struct NotifiedInput {
    reader: BufReader<Stdin>,
}

impl NotifiedInput {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for NotifiedInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for NotifiedInput {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let n = self.reader.read_until(b'\n', &mut line).await?;
        Ok((n > 0).then_some(line))
    }
}

/// Stdin read by a background thread and polled on a fixed interval.
pub struct PolledInput {
    lines: Receiver<Option<Vec<u8>>>,
}

impl PolledInput {
    /// Start the reader thread. Fails when the thread cannot be created.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("cxxrun-stdin".into())
            .spawn(move || {
                let stdin = io::stdin();
                let mut lock = stdin.lock();
                loop {
                    let mut line = Vec::new();
                    let next = match lock.read_until(b'\n', &mut line) {
                        Ok(0) => None,
                        Ok(_) => Some(line),
                        Err(e) => {
                            warn!(target: "cxxrun::relay", error = %e, "stdin read failed");
                            None
                        }
                    };
                    let at_end = next.is_none();
                    if tx.send(next).is_err() || at_end {
                        break;
                    }
                }
            })?;
        Ok(Self { lines: rx })
    }
}

#[async_trait]
impl LineSource for PolledInput {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            match self.lines.try_recv() {
                Ok(line) => return Ok(line),
                Err(TryRecvError::Disconnected) => return Ok(None),
                Err(TryRecvError::Empty) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }
}

/// Input that is already at its end.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedInput;

#[async_trait]
impl LineSource for DetachedInput {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Fixed lines, then end of input. Used to drive a program without a terminal.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    lines: VecDeque<Vec<u8>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LineSource for ScriptedInput {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_input_then_eof() {
        let mut input = ScriptedInput::new(["one\n", "two\n"]);
        assert_eq!(input.next_line().await.unwrap(), Some(b"one\n".to_vec()));
        assert_eq!(input.next_line().await.unwrap(), Some(b"two\n".to_vec()));
        assert_eq!(input.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_detached_input_is_at_end() {
        let mut input = InputMode::Detached.open().unwrap();
        assert!(input.next_line().await.unwrap().is_none());
    }

    #[test]
    fn test_detect_matches_platform() {
        let expected = if cfg!(windows) {
            InputMode::Polled
        } else {
            InputMode::Notified
        };
        assert_eq!(InputMode::detect(), expected);
    }
}
