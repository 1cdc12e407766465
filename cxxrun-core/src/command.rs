//! Compiler command-line assembly.

use std::fmt;
use std::path::Path;

use crate::family::CompilerFamily;

/// Flags split the way the compiler line needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    /// Appended right after the compiler command
    pub compile: Vec<String>,
    /// Appended after the stdin marker (`-L...`, `-l...`, `-Wl,...`)
    pub link: Vec<String>,
}

impl FlagSet {
    /// Split a free-text flag string on whitespace and route each token.
    ///
    /// `-c` is dropped: the pipeline always needs a linked program.
    pub fn classify(raw: &str) -> Self {
        let mut set = FlagSet::default();
        for token in raw.split_whitespace() {
            if is_link_flag(token) {
                set.link.push(token.to_string());
            } else if token != "-c" {
                set.compile.push(token.to_string());
            }
        }
        set
    }
}

fn is_link_flag(token: &str) -> bool {
    let lowered = token.get(..2).map(str::to_ascii_lowercase);
    lowered.as_deref() == Some("-l") || token.starts_with("-Wl,")
}

/// Everything needed to compile one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub compiler_command: String,
    pub flags: Vec<String>,
    pub link_flags: Vec<String>,
    pub source_text: String,
}

impl CompileRequest {
    pub fn new(compiler_command: &str, raw_flags: &str, source: &str) -> Self {
        let FlagSet { compile, link } = FlagSet::classify(raw_flags);
        Self {
            compiler_command: compiler_command.trim().to_string(),
            flags: compile,
            link_flags: link,
            source_text: source.trim().to_string(),
        }
    }

    pub fn family(&self) -> CompilerFamily {
        CompilerFamily::from_command(&self.compiler_command)
    }

    /// Concrete invocation writing the program to `artifact`, reading stdin.
    pub fn to_command(&self, artifact: &Path) -> CompileCommand {
        let mut words = self.compiler_command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        let mut args: Vec<String> = words.collect();

        args.extend(self.flags.iter().cloned());
        if let Some(flag) = self.family().input_language_flag() {
            args.push(flag.to_string());
        }
        args.push("-o".to_string());
        args.push(artifact.display().to_string());
        args.push("-".to_string());
        args.extend(self.link_flags.iter().cloned());

        CompileCommand { program, args }
    }
}

/// A program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CompileCommand {
    /// Split a shell-like command string on whitespace.
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace().map(str::to_string);
        Self {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }
}

impl fmt::Display for CompileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
