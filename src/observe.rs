//! Structured logging setup
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to the host. `init_logging` is a convenience for binaries, tests
//! and benches.
//!
//! ```rust,ignore
//! use multipath_signal::observe::{init_logging, LogConfig, LogLevel};
//!
//! init_logging(&LogConfig { level: LogLevel::Debug, ..Default::default() });
//! ```

use std::fmt;
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    /// Per-trial events
    Debug,
    /// Batch and sweep milestones
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable
    #[default]
    Pretty,
    /// One line per event
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Include thread names (rayon workers are named per pool)
    pub thread_names: bool,
    /// Directive string such as `"multipath_signal=debug"`; overrides `level`
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            thread_names: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Per-trial detail
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            thread_names: true,
            ..Default::default()
        }
    }

    /// Warnings and errors only
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            ..Default::default()
        }
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.filter {
            Some(custom) => {
                EnvFilter::try_new(custom).unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
            }
            // RUST_LOG wins over the configured level
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.to_string())),
        }
    }
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is left in place.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = config.env_filter();

    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tfmt::layer().pretty().with_thread_names(config.thread_names))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(tfmt::layer().compact().with_thread_names(config.thread_names))
            .try_init(),
    };

    result.is_ok()
}
