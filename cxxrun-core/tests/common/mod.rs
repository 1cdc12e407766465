//! 测试辅助工具
//!
//! Scripted stand-ins for a C++ compiler. The "compiler" is a `/bin/sh`
//! script that writes its stdin, prefixed with a shebang, to the `-o` path,
//! so the "program" is a shell script the relay can run.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cxxrun_core::cxxrun_config::ToolchainConfig;
use cxxrun_core::{Compiler, InputMode, OptionResolver, RunnerSettings};
use tempfile::TempDir;

const BUILDING_COMPILER: &str = r#"dir=$(dirname "$0")
printf '%s\n' "$@" > "$dir/args.txt"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
cat > "$dir/source.txt"
{ echo '#!/bin/sh'; cat "$dir/source.txt"; } > "$out"
chmod +x "$out"
"#;

const SILENT_COMPILER: &str = r#"cat > /dev/null
exit 0
"#;

const FAILING_COMPILER: &str = r#"cat > /dev/null
echo "<stdin>: In function 'int main()':" >&2
echo "<stdin>:3:5: error: expected ';' before '}' token" >&2
exit 1
"#;

/// A scratch directory holding a fake compiler and the compiled program.
pub struct Toolchain {
    pub dir: TempDir,
    /// Command line that runs the fake compiler
    pub command: String,
}

impl Toolchain {
    /// Compiler that "builds" its input into a runnable shell script.
    pub fn building() -> Self {
        Self::with_script(BUILDING_COMPILER)
    }

    /// Compiler that always fails with gcc-style diagnostics.
    pub fn failing() -> Self {
        Self::with_script(FAILING_COMPILER)
    }

    /// Compiler that reports success but never writes the program.
    pub fn silent() -> Self {
        Self::with_script(SILENT_COMPILER)
    }

    fn with_script(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = dir.path().join("fakecc.sh");
        fs::write(&script, body).expect("write fake compiler");
        // Run through `sh` so the script never has to be executable.
        let command = format!("sh {}", script.display());
        Self { dir, command }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Arguments the fake compiler received on its last run, one per line.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("args.txt"))
            .expect("compiler was not run")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Source text the fake compiler read from stdin on its last run.
    pub fn recorded_source(&self) -> String {
        fs::read_to_string(self.path().join("source.txt")).expect("compiler was not run")
    }

    /// A compiler whose configured CXX is this toolchain.
    pub fn compiler(&self, cxxflags: &str, ldflags: &str) -> Compiler {
        let config = ToolchainConfig {
            cxx: Some(self.command.clone()),
            cxxflags: cxxflags.to_string(),
            ldflags: ldflags.to_string(),
            ..ToolchainConfig::default()
        };
        Compiler::new(OptionResolver::new(config), self.settings())
    }

    pub fn settings(&self) -> RunnerSettings {
        RunnerSettings {
            artifact_dir: Some(self.path().to_path_buf()),
            debug_source_path: self.path().join("debug.cpp"),
            input_mode: InputMode::Detached,
            ..RunnerSettings::default()
        }
    }

    /// Write a script file next to the compiler.
    pub fn write_source(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("write source");
        path
    }
}

/// Whether a real `g++` is installed.
pub fn has_gxx() -> bool {
    std::process::Command::new("g++")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
