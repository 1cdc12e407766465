//! Compiler invocation and the compile-then-run pipeline.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::annotation::SourceAnnotations;
use crate::artifact::{artifact_path, ArtifactGuard};
use crate::command::{CompileCommand, CompileRequest};
use crate::error::{RunnerError, RunnerResult};
use crate::options::OptionResolver;
use crate::pipe::merge_output;
use crate::relay::{ExecutionRelay, InputMode};
use crate::source::read_program;

const LOG_TARGET: &str = "cxxrun::compiler";

/// Side file holding the last compiled source when debugging.
pub const DEBUG_SOURCE_FILE: &str = "cxxrun_debug.cpp";

/// Outcome of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    /// Normal exit with status 0
    pub succeeded: bool,
    /// Compiler stdout and stderr, interleaved as written
    pub merged_output: String,
    /// The trimmed source that was compiled
    pub source_used: String,
}

/// Process-wide switches for the pipeline.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Persist each compiled source to `debug_source_path`
    pub debug: bool,
    /// UI-mode toggle; recorded for the presentation layer only
    pub ui_mode: bool,
    pub debug_source_path: PathBuf,
    /// Directory for the compiled program; the home directory when `None`
    pub artifact_dir: Option<PathBuf>,
    pub input_mode: InputMode,
    /// Arguments handed to the compiled program
    pub program_args: Vec<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            debug: false,
            ui_mode: false,
            debug_source_path: PathBuf::from(DEBUG_SOURCE_FILE),
            artifact_dir: None,
            input_mode: InputMode::detect(),
            program_args: Vec::new(),
        }
    }
}

/// Compiles source text fed through stdin and runs the result.
///
/// Holds the result of the most recent compile; each compile replaces it.
#[derive(Debug)]
pub struct Compiler {
    resolver: OptionResolver,
    settings: RunnerSettings,
    last: Option<CompileResult>,
}

impl Compiler {
    pub fn new(resolver: OptionResolver, settings: RunnerSettings) -> Self {
        Self {
            resolver,
            settings,
            last: None,
        }
    }

    pub fn resolver(&self) -> &OptionResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Result of the most recent compile, if any.
    pub fn last_result(&self) -> Option<&CompileResult> {
        self.last.as_ref()
    }

    /// Where the compiled program is written.
    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(
            self.resolver.config().artifact_naming,
            self.settings.artifact_dir.as_deref(),
        )
    }

    /// Run `command` with `source` on its stdin and capture its output.
    ///
    /// A compiler that cannot be started produces a failed result whose
    /// output names the error. Only runtime setup failures are `Err`.
    pub fn compile(&mut self, command: &CompileCommand, source: &str) -> RunnerResult<&CompileResult> {
        let source = source.trim().to_string();
        if self.settings.debug {
            self.dump_debug_source(&source);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (succeeded, merged_output) = runtime.block_on(run_compiler(command, &source));

        debug!(target: LOG_TARGET, succeeded, output_len = merged_output.len(), "compiler finished");
        Ok(&*self.last.insert(CompileResult {
            succeeded,
            merged_output,
            source_used: source,
        }))
    }

    /// Compile `source` with `compiler` and `raw_flags`, then run it.
    ///
    /// `Ok` means the compile succeeded and the program could be started;
    /// the program's own exit status does not matter. The compiled program
    /// is removed afterwards in every case.
    pub fn compile_and_execute(
        &mut self,
        compiler: &str,
        raw_flags: &str,
        source: &str,
    ) -> RunnerResult<()> {
        let request = CompileRequest::new(compiler, raw_flags, source);
        let artifact = ArtifactGuard::new(self.artifact_path());
        let command = request.to_command(artifact.path());
        info!(target: LOG_TARGET, %command, "compiling");

        if !self.compile(&command, &request.source_text)?.succeeded {
            return Err(RunnerError::CompileFailed);
        }

        let relay = ExecutionRelay::new(self.settings.input_mode);
        let outcome = relay.run(artifact.path(), &self.settings.program_args)?;
        info!(target: LOG_TARGET, status = ?outcome.status, "program finished");
        Ok(())
    }

    /// Compile with the configured compiler and default flags.
    pub fn compile_source_and_execute(&mut self, source: &str) -> RunnerResult<()> {
        let compiler = self.resolver.compiler_command();
        let flags = self.resolver.default_flag_string();
        self.compile_and_execute(&compiler, &flags, source)
    }

    /// Load a script file, honour its directives and run it.
    pub fn compile_file_and_execute(&mut self, path: &Path) -> RunnerResult<()> {
        let source = read_program(path)?;
        self.compile_script_and_execute(&source)
    }

    /// Run program text that may carry `CompileOptions`/`CXX` directives.
    pub fn compile_script_and_execute(&mut self, source: &str) -> RunnerResult<()> {
        match SourceAnnotations::scan(source) {
            Some(annotations) => {
                let compiler = annotations.compiler_or(self.resolver.compiler_command());
                let flags = self.resolver.flags_for(&compiler, &annotations.compile_options);
                debug!(
                    target: LOG_TARGET,
                    %compiler,
                    %flags,
                    "using source directives"
                );
                self.compile_and_execute(&compiler, &flags, source)
            }
            None => self.compile_source_and_execute(source),
        }
    }

    fn dump_debug_source(&self, source: &str) {
        let path = &self.settings.debug_source_path;
        if let Err(e) = std::fs::write(path, source) {
            warn!(target: LOG_TARGET, path = %path.display(), error = %e, "cannot write debug source");
        }
    }
}

/// Spawn the compiler, feed it `source` and collect its merged output.
async fn run_compiler(command: &CompileCommand, source: &str) -> (bool, String) {
    let spawned = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!(target: LOG_TARGET, program = %command.program, error = %e, "cannot start compiler");
            return (false, format!("cannot start compiler '{}': {e}\n", command.program));
        }
    };

    let mut output = merge_output(child.stdout.take(), child.stderr.take());

    // Fed from its own task so a compiler that talks before reading
    // everything cannot deadlock against us.
    if let Some(mut stdin) = child.stdin.take() {
        let bytes = source.as_bytes().to_vec();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&bytes).await {
                debug!(target: LOG_TARGET, error = %e, "compiler closed its input early");
            }
            drop(stdin);
        });
    }

    let mut merged = Vec::new();
    while let Some(chunk) = output.recv().await {
        merged.extend_from_slice(&chunk);
    }

    let succeeded = match child.wait().await {
        Ok(status) => status.success(),
        Err(e) => {
            warn!(target: LOG_TARGET, error = %e, "waiting for compiler failed");
            false
        }
    };
    (succeeded, String::from_utf8_lossy(&merged).into_owned())
}
