//! Structured logging for arr-core.
//!
//! Two output formats:
//! - Human-readable lines for interactive inspection
//! - JSONL for piping into log tooling
//!
//! # Design Notes
//!
//! - The TUI owns the terminal, so `run` always logs to a file
//!   (see [`LogConfig::ensure_file`]).
//! - `check` logs to stderr; stdout is reserved for its report.
//! - Credential material never reaches a log line; gateway events log the
//!   project id and client email only.

pub mod config;

pub use config::{default_log_file, LogConfig, LogDestination, LogFormat, LogLevel};

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. Malformed
/// `RUST_LOG` directives fall back to the default level. A second call is a
/// no-op.
pub fn init_logging(config: &LogConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_new(config.filter_directives())
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::default().filter_directives()));

    let (writer, use_ansi) = match &config.destination {
        LogDestination::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
        ),
        LogDestination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let installed = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(use_ansi);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(false)
                .flatten_event(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if installed.is_err() {
        tracing::debug!(target: "arr_core::logging", "subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.destination, LogDestination::Stderr);
    }

    #[test]
    fn test_init_logging_creates_file_and_is_reentrant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("debug.log");
        let config = LogConfig::default()
            .with_file(&path)
            .with_format(LogFormat::Jsonl);

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
        assert!(path.exists());
    }
}
