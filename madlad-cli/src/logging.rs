//! CLI logging initialization
//!
//! Per-phase log control on top of `tracing-subscriber`. Logs go to
//! stderr so stdout only carries program results.

use std::io;

use clap::ValueEnum;
use madlad_config::{LogLevel, Phase};
use tracing::Level;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::config::LogConfig;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

pub fn level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Filter with one target per phase
pub fn targets(config: &LogConfig) -> Targets {
    Phase::ALL
        .into_iter()
        .fold(Targets::new().with_default(level(config.global)), |targets, phase| {
            targets.with_target(phase.target(), level(config.level_for(phase)))
        })
        .with_target("madlad::api", level(config.global))
        .with_target("madlad::cli", level(config.global))
}

/// Install the global subscriber. Without a log config the `RUST_LOG`
/// environment variable decides, defaulting to warnings.
pub fn init(config: Option<&LogConfig>, format: LogFormat) {
    let layer = create_format_layer(format, io::stderr);
    // a subscriber installed earlier (tests, embedders) wins
    let _ = match config {
        Some(config) => tracing_subscriber::registry()
            .with(layer.with_filter(targets(config)))
            .try_init(),
        None => {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            tracing_subscriber::registry()
                .with(layer.with_filter(filter))
                .try_init()
        }
    };
}

fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: io::Write + 'static,
    F: Fn() -> W + Send + Sync + 'static,
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
            .with_target(true)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level(LogLevel::Error), Level::ERROR);
        assert_eq!(level(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_targets_apply_phase_overrides() {
        let mut config = LogConfig::new(LogLevel::Warn);
        config.phases.insert(Phase::Vm, LogLevel::Trace);
        let targets = targets(&config);
        assert!(targets.would_enable("madlad::vm", &Level::TRACE));
        assert!(!targets.would_enable("madlad::compiler", &Level::INFO));
        assert!(targets.would_enable("madlad::compiler", &Level::WARN));
        assert!(targets.would_enable("other", &Level::WARN));
        assert!(!targets.would_enable("other", &Level::INFO));
    }
}
