//! cxxrun Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all cxxrun crates.

use serde::Deserialize;

/// Toolchain settings as stored in the user's configuration file.
///
/// Key names follow the conventional make variables so an existing
/// environment can be copied over verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolchainConfig {
    /// Compiler command; empty or missing selects the platform default
    #[serde(rename = "CXX", default)]
    pub cxx: Option<String>,
    /// Flags passed to every compilation
    #[serde(rename = "CXXFLAGS", default)]
    pub cxxflags: String,
    /// Flags that only matter at link time
    #[serde(rename = "LDFLAGS", default)]
    pub ldflags: String,
    /// How the temporary binary is named
    #[serde(default)]
    pub artifact_naming: ArtifactNaming,
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

/// Naming policy for the temporary compiled program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// One fixed file per user. Concurrent runs race on it.
    #[default]
    PerUser,
    /// The process id is part of the file name.
    PerProcess,
}

/// Log verbosity shared by the CLI and the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, case-insensitively. `silent` maps to `Error`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Pipeline phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Options,
    Compiler,
    Relay,
    Report,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Options, Phase::Compiler, Phase::Relay, Phase::Report];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Options => "options",
            Phase::Compiler => "compiler",
            Phase::Relay => "relay",
            Phase::Report => "report",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> &'static str {
        match self {
            Phase::Options => "cxxrun::options",
            Phase::Compiler => "cxxrun::compiler",
            Phase::Relay => "cxxrun::relay",
            Phase::Report => "cxxrun::report",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolchain_config() {
        let cfg = ToolchainConfig::default();
        assert!(cfg.cxx.is_none());
        assert!(cfg.cxxflags.is_empty());
        assert_eq!(cfg.artifact_naming, ArtifactNaming::PerUser);
    }

    #[test]
    fn test_deserialize_make_style_keys() {
        let cfg: ToolchainConfig = serde_json::from_str(
            r#"{ "CXX": "clang++", "CXXFLAGS": "-Wall", "LDFLAGS": "-lm",
                 "artifact_naming": "per_process", "log_level": "debug" }"#,
        )
        .unwrap();
        assert_eq!(cfg.cxx.as_deref(), Some("clang++"));
        assert_eq!(cfg.cxxflags, "-Wall");
        assert_eq!(cfg.ldflags, "-lm");
        assert_eq!(cfg.artifact_naming, ArtifactNaming::PerProcess);
        assert_eq!(cfg.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_deserialize_empty_object() {
        let cfg: ToolchainConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ToolchainConfig::default());
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("silent"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_phase_target() {
        assert_eq!(Phase::Compiler.as_str(), "compiler");
        assert_eq!(Phase::Relay.target(), "cxxrun::relay");
        assert!(Phase::ALL.iter().all(|p| p.target().ends_with(p.as_str())));
    }
}
