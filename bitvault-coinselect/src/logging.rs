//! Logging setup for the coin selection engine
//!
//! The engine itself only talks to the `log` facade. Applications that have
//! no logger of their own can call [`init`] to install an `env_logger`
//! backend, either human-readable or JSON lines.
//!
//! Transaction ids of selected coins are shortened with
//! [`sanitize_for_logging`] before they reach a log line, so logs do not
//! carry a complete map of the wallet's coins.
//!
//! # Usage
//!
//! ```
//! use bitvault_coinselect::logging::{self, LogConfig, LogLevel};
//!
//! let config = LogConfig {
//!     level: LogLevel::Warn,
//!     ..LogConfig::default()
//! };
//! logging::init(&config).expect("Failed to initialize logging");
//! ```

use chrono::Local;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write as IoWrite;
use std::sync::Once;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error conditions
    Error,
    /// Warning conditions
    Warn,
    /// Informational messages
    Info,
    /// Debug-level messages, one per strategy outcome
    Debug,
    /// Trace level (very verbose)
    Trace,
}

/// Configuration for the logging backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level that is emitted
    pub level: LogLevel,
    /// Path to log file (None for stderr)
    pub log_file: Option<String>,
    /// Whether to include timestamps in log messages
    pub include_timestamps: bool,
    /// Whether to include source location in log messages
    pub include_source_location: bool,
    /// Whether to use JSON format for logs (machine-readable)
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_file: None,
            include_timestamps: true,
            include_source_location: false,
            json_format: false,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

static LOGGING_INIT: Once = Once::new();

/// Initialize the logging backend with the given configuration
///
/// Only the first call installs a logger. Later calls return `Ok(())`
/// without changing anything; use [`set_log_level`] to adjust verbosity
/// afterwards. A logger installed by someone else is left in place.
///
/// # Arguments
/// * `config` - Configuration for the logging backend
///
/// # Returns
/// * `Err` with a description if the log file could not be opened
pub fn init(config: &LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    let include_timestamps = config.include_timestamps;
    let include_source_location = config.include_source_location;
    let json_format = config.json_format;
    let log_file = config.log_file.clone();
    let level = config.level;

    LOGGING_INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level.into());

        builder.format(move |buf, record| {
            let timestamp = if include_timestamps {
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
            } else {
                String::new()
            };

            let source_location = if include_source_location {
                format!(" [{}:{}]", record.file().unwrap_or("unknown"), record.line().unwrap_or(0))
            } else {
                String::new()
            };

            if json_format {
                let line = json!({
                    "timestamp": timestamp,
                    "level": record.level().to_string(),
                    "target": record.target(),
                    "location": source_location.trim(),
                    "message": record.args().to_string(),
                });

                writeln!(buf, "{}", line)
            } else {
                let mut style = buf.style();
                style.set_bold(true);

                if include_timestamps {
                    write!(buf, "{} ", timestamp)?;
                }

                writeln!(
                    buf,
                    "[{}{}] {}",
                    style.value(record.level()),
                    source_location,
                    record.args()
                )
            }
        });

        if let Some(file_path) = &log_file {
            match OpenOptions::new().create(true).append(true).open(file_path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => {
                    result = Err(format!("Failed to open log file {}: {}", file_path, e));
                    return;
                }
            }
        }

        if builder.try_init().is_err() {
            // Another logger is already installed; keep using it
            debug!("Logger already initialized, using existing instance");
        }
    });

    result
}

/// Update the log level dynamically
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.into());
}

/// Shorten an identifier for logging
///
/// Keeps the first and last four characters. Anything of eight characters
/// or fewer is masked entirely.
pub fn sanitize_for_logging(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "*****".to_string();
    }

    let first: String = chars[..4].iter().collect();
    let last: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", first, last)
}
