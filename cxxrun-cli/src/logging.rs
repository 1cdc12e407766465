//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。Logs go to stderr so
//! they never mix with the relayed program's stdout.

use std::io;
use std::path::Path;
use std::sync::Mutex;

use cxxrun_config::Phase;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};

use crate::config::LogConfig;

/// Target used by the binary itself.
pub const CLI_TARGET: &str = "cxxrun::cli";

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    #[default]
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// Per-phase filter for the given configuration.
pub fn targets(log_config: &LogConfig) -> Targets {
    Phase::ALL
        .into_iter()
        .fold(Targets::new().with_default(log_config.global), |targets, phase| {
            targets.with_target(phase.target(), log_config.level_for(phase))
        })
        .with_target(CLI_TARGET, log_config.global)
}

/// Install the global subscriber, optionally copying records to `file`.
pub fn init(log_config: &LogConfig, format: LogFormat, file: Option<&Path>) -> io::Result<()> {
    let targets = targets(log_config);

    let file_layer = match file {
        Some(path) => {
            let handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(targets.clone()),
            )
        }
        None => None,
    };

    let console_layer = format_layer(format, io::stderr).with_filter(targets);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)
}

/// Create formatter layer based on format
fn format_layer<S, W>(format: LogFormat, make_writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
