//! Logging configuration.
//!
//! Precedence, highest first:
//! 1. CLI flags (`--log-level`, `--log-format`, `--log-file`)
//! 2. `ARR_LOG`, `ARR_LOG_FORMAT`, `ARR_LOG_FILE`
//! 3. `RUST_LOG`, passed through verbatim as filter directives
//! 4. Defaults: `info`, human format, stderr

use std::path::PathBuf;

use clap::ValueEnum;

/// Directory under the user cache dir holding `debug.log`.
const LOG_DIR: &str = "arrogance";
const LOG_FILE: &str = "debug.log";

/// Crate and event targets the level applies to.
const TARGETS: &[&str] = &["arr_core", "arr_common", "tui", "gateway"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Stderr,
    /// Append to a file. Required while the TUI owns the terminal.
    File(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    pub destination: LogDestination,
    /// Raw `RUST_LOG` directives, kept only when no level was chosen explicitly.
    pub directives: Option<String>,
}

impl LogConfig {
    /// Build from the process environment plus CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_sources(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Build from an arbitrary variable lookup plus CLI overrides.
    pub fn from_sources(
        var: impl Fn(&str) -> Option<String>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let env_level = var("ARR_LOG").and_then(|v| LogLevel::from_str(v.trim(), true).ok());
        let env_format =
            var("ARR_LOG_FORMAT").and_then(|v| LogFormat::from_str(v.trim(), true).ok());

        let level = cli_level.or(env_level);
        LogConfig {
            format: cli_format.or(env_format).unwrap_or_default(),
            level: level.unwrap_or_default(),
            destination: var("ARR_LOG_FILE")
                .map(|path| LogDestination::File(PathBuf::from(path)))
                .unwrap_or_default(),
            directives: if level.is_some() {
                None
            } else {
                var("RUST_LOG")
            },
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Log to a file instead of stderr.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = LogDestination::File(path.into());
        self
    }

    /// Redirect to the default log file unless a file was already chosen.
    ///
    /// Used by the TUI, where stderr writes would corrupt the screen.
    pub fn ensure_file(mut self) -> Self {
        if self.destination == LogDestination::Stderr {
            self.destination = LogDestination::File(default_log_file());
        }
        self
    }

    /// `EnvFilter` directive string for this configuration.
    pub fn filter_directives(&self) -> String {
        if let Some(ref raw) = self.directives {
            return raw.clone();
        }
        TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `<cache>/arrogance/debug.log`, or `./debug.log` when no cache dir exists.
pub fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(LOG_DIR).join(LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE))
}
