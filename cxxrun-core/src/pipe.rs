//! Merging a child's stdout and stderr into one chunk stream.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

const CHUNK_SIZE: usize = 4096;

/// Chunks from a child's output pipes. Dropping it stops the drain tasks.
#[derive(Debug)]
pub(crate) struct MergedOutput {
    rx: UnboundedReceiver<Vec<u8>>,
    tasks: Vec<JoinHandle<()>>,
}

impl MergedOutput {
    /// Next chunk, or `None` once every pipe has reached end of file.
    pub(crate) async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Chunks that arrive before `deadline`.
    ///
    /// Stops early at end of file; a pipe kept open past the deadline (a
    /// background process holding it, say) is not waited for.
    pub(crate) async fn recv_until(&mut self, deadline: Instant) -> Option<Vec<u8>> {
        tokio::time::timeout_at(deadline, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for MergedOutput {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Drain both pipes concurrently, in arrival order.
///
/// Must be called from within a tokio runtime.
pub(crate) fn merge_output<O, E>(stdout: Option<O>, stderr: Option<E>) -> MergedOutput
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let mut tasks = Vec::with_capacity(2);
    if let Some(pipe) = stdout {
        tasks.push(tokio::spawn(drain(pipe, tx.clone(), "stdout")));
    }
    if let Some(pipe) = stderr {
        tasks.push(tokio::spawn(drain(pipe, tx.clone(), "stderr")));
    }
    MergedOutput { rx, tasks }
}

async fn drain<R>(mut pipe: R, tx: UnboundedSender<Vec<u8>>, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                trace!(target: "cxxrun::relay", pipe = name, error = %e, "pipe read failed");
                break;
            }
        }
    }
}
