//! Structured logging infrastructure for Woxl

use crate::error::{Result, WoxlError};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "woxl_commands=trace")
    pub level: String,
    /// Whether to emit JSON lines
    pub json_format: bool,
    /// Whether to use the multi-line pretty formatter on the console
    pub pretty_format: bool,
    /// Optional directory for daily-rolling log files
    pub file_dir: Option<PathBuf>,
    /// File name prefix inside `file_dir`
    pub file_prefix: String,
    /// Whether to log span open/close events
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_dir: None,
            file_prefix: "woxl.log".to_string(),
            include_spans: false,
            include_targets: true,
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn fmt_layer<W>(config: &LoggingConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(span_events)
        .with_target(config.include_targets);

    if config.json_format {
        layer.json().with_filter(env_filter(&config.level)).boxed()
    } else if config.pretty_format && ansi {
        layer.pretty().with_filter(env_filter(&config.level)).boxed()
    } else {
        layer.compact().with_filter(env_filter(&config.level)).boxed()
    }
}

/// Initialize the global tracing subscriber.
///
/// Console output always goes to stdout. When `file_dir` is set a second,
/// non-blocking daily-rolling file layer is installed and its flush guard is
/// returned; the caller must keep it alive until shutdown.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(config, std::io::stdout, true)];

    let guard = if let Some(dir) = &config.file_dir {
        std::fs::create_dir_all(dir)?;
        let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(config, writer, false));
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| WoxlError::config_with_source("failed to install tracing subscriber", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
        assert!(config.file_dir.is_none());
        assert_eq!(config.file_prefix, "woxl.log");
    }

    #[test]
    fn test_filter_keeps_level() {
        assert_eq!(env_filter("debug").to_string(), "debug");
    }
}
