//! Effective compiler command and flags derived from configuration.

use cxxrun_config::ToolchainConfig;
use tracing::debug;

use crate::family::CompilerFamily;

const LOG_TARGET: &str = "cxxrun::options";

#[cfg(target_os = "macos")]
const DEFAULT_CXX: &str = "clang++";
#[cfg(all(not(target_os = "macos"), target_env = "msvc"))]
const DEFAULT_CXX: &str = "cl.exe";
#[cfg(all(not(target_os = "macos"), not(target_env = "msvc")))]
const DEFAULT_CXX: &str = "g++";

/// Reads toolchain settings and fills in platform defaults.
#[derive(Debug, Clone, Default)]
pub struct OptionResolver {
    config: ToolchainConfig,
}

impl OptionResolver {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Configured compiler, or the platform default when unset or blank.
    pub fn compiler_command(&self) -> String {
        match self.config.cxx.as_deref().map(str::trim) {
            Some(cxx) if !cxx.is_empty() => cxx.to_string(),
            _ => DEFAULT_CXX.to_string(),
        }
    }

    pub fn compile_flags(&self) -> String {
        self.config.cxxflags.trim().to_string()
    }

    pub fn link_flags(&self) -> String {
        self.config.ldflags.trim().to_string()
    }

    /// Compile and link flags joined, plus the compiler family's default
    /// language standard unless one is already configured.
    pub fn default_flag_string(&self) -> String {
        self.flags_for(&self.compiler_command(), "")
    }

    /// Configured flags followed by `extra`, for the given compiler.
    ///
    /// The family's default standard is appended only when neither the
    /// configuration nor `extra` selects one.
    pub fn flags_for(&self, compiler: &str, extra: &str) -> String {
        let mut flags = [self.compile_flags(), self.link_flags(), extra.trim().to_string()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let family = CompilerFamily::from_command(compiler);
        if let Some(standard) = family.default_standard_flag() {
            let has_standard = flags
                .split_whitespace()
                .any(|token| token.starts_with("-std=") || token.starts_with("/std:"));
            if !has_standard {
                if !flags.is_empty() {
                    flags.push(' ');
                }
                flags.push_str(standard);
            }
        }

        debug!(target: LOG_TARGET, ?family, %flags, "resolved flags");
        flags
    }
}
