//! CLI 配置
//!
//! Log levels per pipeline phase, and loading the toolchain file.

use std::path::{Path, PathBuf};

use cxxrun_config::{LogLevel, Phase, ToolchainConfig};
use tracing::Level;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub options: Option<Level>,
    pub compiler: Option<Level>,
    pub relay: Option<Level>,
    pub report: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            options: None,
            compiler: None,
            relay: None,
            report: None,
        }
    }
}

impl LogConfig {
    pub fn with_global(level: LogLevel) -> Self {
        Self {
            global: to_tracing_level(level),
            ..Self::default()
        }
    }

    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        let level = match phase {
            Phase::Options => self.options,
            Phase::Compiler => self.compiler,
            Phase::Relay => self.relay,
            Phase::Report => self.report,
        };
        level.unwrap_or(self.global)
    }

    /// Apply a `phase=level` override such as `relay=trace`.
    pub fn apply_override(&mut self, spec: &str) -> Result<(), String> {
        let (name, level) = spec
            .split_once('=')
            .ok_or_else(|| format!("expected PHASE=LEVEL, got '{spec}'"))?;
        let phase = Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == name.trim())
            .ok_or_else(|| format!("unknown phase '{}'", name.trim()))?;
        let level = LogLevel::parse(level.trim())
            .map(to_tracing_level)
            .ok_or_else(|| format!("unknown log level '{}'", level.trim()))?;

        let slot = match phase {
            Phase::Options => &mut self.options,
            Phase::Compiler => &mut self.compiler,
            Phase::Relay => &mut self.relay,
            Phase::Report => &mut self.report,
        };
        *slot = Some(level);
        Ok(())
    }
}

pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// `~/.config/cxxrun/config.json` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cxxrun").join(CONFIG_FILE))
}

/// Read the toolchain file. A missing file yields the defaults; an
/// explicitly named file must exist.
pub fn load_toolchain(explicit: Option<&Path>) -> Result<ToolchainConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ToolchainConfig::default()),
        },
    };

    if !path.exists() {
        return Err(format!("config file '{}' not found", path.display()));
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}
