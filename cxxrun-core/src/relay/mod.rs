//! Running the compiled program with a live terminal.
//!
//! The relay drives three things at once: draining the child's output to the
//! terminal as it arrives, forwarding the user's lines to the child's stdin,
//! and waiting for the child to exit. The forwarding task and the foreground
//! loop only share the child's pipes and an "exited" token.

mod input;

pub use input::{DetachedInput, InputMode, LineSource, NotifiedInput, PolledInput, ScriptedInput};

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::RelayError;
use crate::pipe::merge_output;

const LOG_TARGET: &str = "cxxrun::relay";

/// Poll tick used by input sources that cannot be notified.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long output is still collected after the program has exited.
pub const FINAL_DRAIN: Duration = Duration::from_millis(100);

/// How a relayed program ended.
#[derive(Debug, Clone, Copy)]
pub struct RelayOutcome {
    /// The program's own exit status; `None` if waiting for it failed
    pub status: Option<ExitStatus>,
    /// Output bytes printed to the terminal
    pub bytes_relayed: usize,
}

impl RelayOutcome {
    pub fn success(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }

    pub fn code(&self) -> Option<i32> {
        self.status.and_then(|s| s.code())
    }
}

/// Runs programs with their output and input tied to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionRelay {
    input_mode: InputMode,
}

impl ExecutionRelay {
    pub fn new(input_mode: InputMode) -> Self {
        Self { input_mode }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Run `program` until it exits, relaying output to stdout.
    ///
    /// The program is started before terminal input is opened; if input
    /// cannot be opened the error is returned and the program is left running.
    pub fn run(&self, program: &Path, args: &[String]) -> Result<RelayOutcome, RelayError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let result = runtime.block_on(async {
            let session = ExecutionSession::start(program, args)?;
            let input = self.input_mode.open().map_err(|e| {
                error!(target: LOG_TARGET, error = %e, "stdin open error");
                RelayError::InputUnavailable(e)
            })?;
            session.relay(input, tokio::io::stdout()).await
        });

        // A blocking stdin read may still be pending; do not wait for it.
        runtime.shutdown_background();
        result
    }
}

/// One running program and its pipes.
#[derive(Debug)]
pub struct ExecutionSession {
    child: Child,
    output_buffer: Vec<u8>,
    input_open: Arc<AtomicBool>,
}

impl ExecutionSession {
    /// Spawn `program` with piped stdio.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime with I/O enabled.
    /// [`ExecutionRelay::run`] provides one.
    pub fn start(program: &Path, args: &[String]) -> Result<Self, RelayError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RelayError::Spawn {
                path: program.to_path_buf(),
                source,
            })?;

        debug!(target: LOG_TARGET, program = %program.display(), pid = ?child.id(), "program started");
        Ok(Self {
            child,
            output_buffer: Vec::new(),
            input_open: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Whether the child's stdin is still connected to the terminal.
    pub fn input_open(&self) -> bool {
        self.input_open.load(Ordering::Acquire)
    }

    /// Relay until the child exits, then flush the output that follows
    /// within [`FINAL_DRAIN`].
    ///
    /// Failing to write to `out` ends printing but not the session: the
    /// child is still waited for and the outcome is returned.
    pub async fn relay<W>(
        mut self,
        input: Box<dyn LineSource>,
        mut out: W,
    ) -> Result<RelayOutcome, RelayError>
    where
        W: AsyncWrite + Unpin,
    {
        let exited = CancellationToken::new();
        let mut output = merge_output(self.child.stdout.take(), self.child.stderr.take());

        let forwarder = match self.child.stdin.take() {
            Some(stdin) => Some(tokio::spawn(forward_input(
                input,
                stdin,
                exited.clone(),
                Arc::clone(&self.input_open),
            ))),
            None => {
                self.input_open.store(false, Ordering::Release);
                None
            }
        };

        let mut printer = Printer::new(&mut out);
        let status = loop {
            tokio::select! {
                status = self.child.wait() => break status,
                Some(chunk) = output.recv() => {
                    printer.emit(&mut self.output_buffer, &chunk).await;
                }
            }
        };
        exited.cancel();
        let status = match status {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(target: LOG_TARGET, error = %e, "waiting for program failed");
                None
            }
        };

        // Output written between the last chunk and the exit. Background
        // processes may keep the pipes open, so this is bounded.
        let deadline = Instant::now() + FINAL_DRAIN;
        while let Some(chunk) = output.recv_until(deadline).await {
            printer.emit(&mut self.output_buffer, &chunk).await;
        }
        drop(output);
        let bytes_relayed = printer.written;

        if let Some(handle) = forwarder {
            if let Err(e) = handle.await {
                warn!(target: LOG_TARGET, error = %e, "input forwarder failed");
            }
        }

        debug!(target: LOG_TARGET, ?status, bytes_relayed, "program exited");
        Ok(RelayOutcome {
            status,
            bytes_relayed,
        })
    }
}

/// Terminal writer that goes quiet after its first failure.
struct Printer<'a, W> {
    out: &'a mut W,
    open: bool,
    written: usize,
}

impl<'a, W> Printer<'a, W>
where
    W: AsyncWrite + Unpin,
{
    fn new(out: &'a mut W) -> Self {
        Self {
            out,
            open: true,
            written: 0,
        }
    }

    /// Print a chunk through the session buffer and flush it at once.
    async fn emit(&mut self, buffer: &mut Vec<u8>, chunk: &[u8]) {
        if !self.open {
            return;
        }
        buffer.extend_from_slice(chunk);
        let result = match self.out.write_all(buffer).await {
            Ok(()) => self.out.flush().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.written += buffer.len(),
            Err(e) => {
                debug!(target: LOG_TARGET, error = %e, "terminal output closed, discarding the rest");
                self.open = false;
            }
        }
        buffer.clear();
    }
}

/// Copy terminal lines to the child until input ends or the child exits.
/// Dropping `stdin` on the way out closes the child's input channel.
async fn forward_input(
    mut input: Box<dyn LineSource>,
    mut stdin: ChildStdin,
    exited: CancellationToken,
    input_open: Arc<AtomicBool>,
) {
    loop {
        let line = tokio::select! {
            _ = exited.cancelled() => break,
            line = input.next_line() => line,
        };
        match line {
            Ok(Some(bytes)) => {
                let written = match stdin.write_all(&bytes).await {
                    Ok(()) => stdin.flush().await,
                    Err(e) => Err(e),
                };
                if let Err(e) = written {
                    debug!(target: LOG_TARGET, error = %e, "child stopped reading input");
                    break;
                }
            }
            Ok(None) => {
                debug!(target: LOG_TARGET, "end of terminal input, closing child stdin");
                break;
            }
            Err(e) => {
                warn!(target: LOG_TARGET, error = %e, "terminal read failed");
                break;
            }
        }
    }
    input_open.store(false, Ordering::Release);
    drop(stdin);
}
