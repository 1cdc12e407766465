//! cxxrun Core - compile a source fragment through stdin and run it
//!
//! Pipeline:
//! - [`SourceAnnotations`] picks up `// CompileOptions:` and `// CXX:` directives
//! - [`OptionResolver`] supplies the configured compiler and flags
//! - [`Compiler`] assembles the command line, feeds the source to the
//!   compiler's stdin and captures its merged output
//! - [`ExecutionRelay`] runs the program with a live terminal
//! - [`report`] turns a failed compile into a dump or a single line
//!
//! ```ignore
//! use cxxrun_core::{Compiler, OptionResolver, RunnerSettings};
//!
//! let mut compiler = Compiler::new(OptionResolver::default(), RunnerSettings::default());
//! if let Err(e) = compiler.compile_source_and_execute("int main() { return 0; }") {
//!     if let Some(result) = compiler.last_result() {
//!         cxxrun_core::report::print_context(result, &mut std::io::stderr())?;
//!     }
//!     std::process::exit(e.exit_code());
//! }
//! ```

pub mod annotation;
mod artifact;
pub mod command;
pub mod compiler;
pub mod error;
pub mod family;
pub mod options;
mod pipe;
pub mod relay;
pub mod report;
pub mod source;

pub use annotation::SourceAnnotations;
pub use artifact::artifact_path;
pub use command::{CompileCommand, CompileRequest, FlagSet};
pub use compiler::{CompileResult, Compiler, RunnerSettings, DEBUG_SOURCE_FILE};
pub use error::{RelayError, RunnerError, RunnerResult};
pub use family::CompilerFamily;
pub use options::OptionResolver;
pub use relay::{ExecutionRelay, ExecutionSession, InputMode, LineSource, RelayOutcome};
pub use report::ReportMode;

pub use cxxrun_config;
