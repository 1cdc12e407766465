//! cxxrun CLI - Command line interface
//!
//! Compiles a C/C++ script or fragment through the compiler's stdin and runs
//! the result with the terminal attached.

use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

mod config;
mod logging;
mod platform;

use crate::config::{load_toolchain, LogConfig};
use crate::logging::{LogFormat, CLI_TARGET};
use crate::platform::{print_failure, ErrorStyle};
use cxxrun_config::LogLevel;
use cxxrun_core::source::program_text;
use cxxrun_core::{Compiler, InputMode, OptionResolver, RunnerSettings};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "cxxrun",
    about = "Compile a C/C++ source through stdin and run it",
    version
)]
struct Cli {
    /// Source file; `-` or nothing reads the source from piped stdin
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Arguments handed to the compiled program
    #[arg(last = true, value_name = "PROGRAM_ARGS")]
    program_args: Vec<String>,

    /// Toolchain file (default: <config dir>/cxxrun/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save each compiled source to cxxrun_debug.cpp
    #[arg(long)]
    debug: bool,

    /// UI mode toggle
    #[arg(long)]
    qt: bool,

    /// How compiler diagnostics are shown
    #[arg(long, value_enum, default_value_t = ErrorStyle::Context)]
    errors: ErrorStyle,

    /// Log level: "silent", "error", "warn", "info", "debug", "trace"
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Per-phase log level, e.g. `relay=trace` (repeatable)
    #[arg(long = "log-phase", value_name = "PHASE=LEVEL")]
    log_phase: Vec<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Also append log records to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Where the program text comes from.
enum Script {
    File(PathBuf),
    Piped(String),
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    let toolchain = match load_toolchain(cli.config.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let log_config = match build_log_config(&cli, toolchain.log_level) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = logging::init(&log_config, cli.log_format, cli.log_file.as_deref()) {
        eprintln!("Error: cannot initialize logging: {}", e);
        process::exit(1);
    }

    let script = match select_script(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // Piped source owns stdin, so the program gets no terminal input.
    let input_mode = match script {
        Script::File(_) => InputMode::detect(),
        Script::Piped(_) => InputMode::Detached,
    };
    info!(target: CLI_TARGET, debug = cli.debug, ui_mode = cli.qt, ?input_mode, "starting");

    let settings = RunnerSettings {
        debug: cli.debug,
        ui_mode: cli.qt,
        input_mode,
        program_args: cli.program_args.clone(),
        ..RunnerSettings::default()
    };
    let mut compiler = Compiler::new(OptionResolver::new(toolchain), settings);
    debug!(target: CLI_TARGET, artifact = %compiler.artifact_path().display(), "artifact path");

    let outcome = match &script {
        Script::File(path) => compiler.compile_file_and_execute(path),
        Script::Piped(text) => compiler.compile_script_and_execute(text),
    };

    if let Err(e) = outcome {
        print_failure(&e, compiler.last_result(), cli.errors);
        process::exit(e.exit_code());
    }
}

/// Accept the single-dash spellings `-debug` and `-qt` before `--`.
fn normalize_args<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            match arg.as_str() {
                "--" => {
                    passthrough = true;
                    arg
                }
                "-debug" => "--debug".to_string(),
                "-qt" => "--qt".to_string(),
                _ => arg,
            }
        })
        .collect()
}

/// CLI level wins over the config file; phase overrides apply on top.
fn build_log_config(cli: &Cli, configured: Option<LogLevel>) -> Result<LogConfig, String> {
    let level = match cli.log_level.as_deref() {
        Some(s) => {
            Some(LogLevel::parse(s).ok_or_else(|| format!("unknown log level '{s}'"))?)
        }
        None => configured,
    };
    let mut log_config = level.map(LogConfig::with_global).unwrap_or_default();
    for spec in &cli.log_phase {
        log_config.apply_override(spec)?;
    }
    Ok(log_config)
}

fn select_script(cli: &Cli) -> Result<Script, String> {
    match cli.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => Ok(Script::File(path.to_path_buf())),
        explicit => {
            let stdin = std::io::stdin();
            if explicit.is_none() && stdin.is_terminal() {
                return Err("no source file given (pass FILE, or pipe the source on stdin)".into());
            }
            let mut contents = String::new();
            stdin
                .lock()
                .read_to_string(&mut contents)
                .map_err(|e| format!("cannot read source from stdin: {}", e))?;
            Ok(Script::Piped(program_text(&contents)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_dash_switches() {
        let normalized = normalize_args(args(&["cxxrun", "-debug", "-qt", "a.cpp"]));
        assert_eq!(normalized, args(&["cxxrun", "--debug", "--qt", "a.cpp"]));
    }

    #[test]
    fn test_program_args_untouched() {
        let normalized = normalize_args(args(&["cxxrun", "a.cpp", "--", "-debug", "-qt"]));
        assert_eq!(normalized, args(&["cxxrun", "a.cpp", "--", "-debug", "-qt"]));
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::parse_from(normalize_args(args(&[
            "cxxrun", "-debug", "--errors", "full", "--log-phase", "relay=trace", "a.cpp", "--",
            "x", "-y",
        ])));
        assert!(cli.debug);
        assert!(!cli.qt);
        assert_eq!(cli.errors, ErrorStyle::Full);
        assert_eq!(cli.file, Some(PathBuf::from("a.cpp")));
        assert_eq!(cli.program_args, args(&["x", "-y"]));
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(args(&["cxxrun", "--log-level", "debug", "a.cpp"]));
        let config = build_log_config(&cli, Some(LogLevel::Error)).unwrap();
        assert_eq!(config.global, tracing::Level::DEBUG);

        let cli = Cli::parse_from(args(&["cxxrun", "a.cpp"]));
        let config = build_log_config(&cli, Some(LogLevel::Error)).unwrap();
        assert_eq!(config.global, tracing::Level::ERROR);

        let cli = Cli::parse_from(args(&["cxxrun", "--log-level", "loud", "a.cpp"]));
        assert!(build_log_config(&cli, None).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
