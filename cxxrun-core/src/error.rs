//! Unified error types for the compile-and-run pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while starting or relaying the compiled program.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The artifact could not be started
    #[error("cannot execute '{}': {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The terminal's input stream could not be opened
    #[error("stdin open error: {0}")]
    InputUnavailable(#[source] io::Error),

    /// The relay runtime could not be set up
    #[error("relay I/O error: {0}")]
    Io(#[from] io::Error),
}

/// cxxrun 错误类型
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The source file could not be read
    #[error("no such file or directory, {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compiler exited abnormally or with a nonzero status.
    /// Diagnostics stay on the compiler's last result.
    #[error("compilation failed")]
    CompileFailed,

    /// The compiled program could not be relayed
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Generic I/O failure while driving the compiler
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RunnerError {
    /// Process exit code for this failure. Success is always 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::Relay(_) => 2,
            RunnerError::SourceRead { .. } | RunnerError::CompileFailed | RunnerError::Io(_) => 1,
        }
    }

    /// Get the pipeline phase name
    pub fn phase(&self) -> &'static str {
        match self {
            RunnerError::SourceRead { .. } => "source",
            RunnerError::CompileFailed | RunnerError::Io(_) => "compiler",
            RunnerError::Relay(_) => "relay",
        }
    }
}

/// Result alias used throughout the core.
pub type RunnerResult<T> = Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_nonzero() {
        let compile = RunnerError::CompileFailed;
        let relay = RunnerError::from(RelayError::InputUnavailable(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "closed",
        )));
        assert_eq!(compile.exit_code(), 1);
        assert_eq!(relay.exit_code(), 2);
        assert_eq!(relay.phase(), "relay");
    }

    #[test]
    fn test_source_read_display() {
        let err = RunnerError::SourceRead {
            path: PathBuf::from("missing.cpp"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.cpp"));
        assert_eq!(err.phase(), "source");
    }
}
