//! CLI 格式化输出
//!
//! 把流水线错误打印到终端。

use std::io::{self, Write};

use cxxrun_core::report::{self, ReportMode};
use cxxrun_core::{CompileResult, RunnerError};

/// How compiler diagnostics are shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorStyle {
    /// Header plus every line the compiler printed
    Full,
    /// A single best-guess line
    #[default]
    Context,
}

impl From<ErrorStyle> for ReportMode {
    fn from(style: ErrorStyle) -> Self {
        match style {
            ErrorStyle::Full => ReportMode::Full,
            ErrorStyle::Context => ReportMode::Context,
        }
    }
}

/// Print a pipeline failure to stderr.
pub fn print_failure(e: &RunnerError, last: Option<&CompileResult>, style: ErrorStyle) {
    let mut stderr = io::stderr().lock();
    if let Err(write_err) = write_failure(e, last, style, &mut stderr) {
        eprintln!("{e} ({write_err})");
    }
}

/// Compile failures go through the reporter; everything else is one line.
pub fn write_failure<W: Write>(
    e: &RunnerError,
    last: Option<&CompileResult>,
    style: ErrorStyle,
    out: &mut W,
) -> io::Result<()> {
    match (e, last) {
        (RunnerError::CompileFailed, Some(result)) => report::report(style.into(), result, out),
        _ => {
            writeln!(out, "❌ {e}")?;
            out.flush()
        }
    }
}
