//! Logging setup
//!
//! Everything logs through `tracing`. The subscriber is configured from
//! `TRON_DEX_LOG_LEVEL`, `TRON_DEX_LOG_FORMAT` and `TRON_DEX_LOG_FILE`, with
//! `RUST_LOG` taking precedence over the level when set.

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Write to this file instead of stderr (the terminal UI owns stdout)
    pub log_file_path: Option<PathBuf>,
    pub enable_colors: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            log_file_path: None,
            enable_colors: true,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = env::var("TRON_DEX_LOG_LEVEL") {
            config.level = level.parse().unwrap_or(LogLevel::Info);
        }
        if let Ok(format) = env::var("TRON_DEX_LOG_FORMAT") {
            config.format = format.parse().unwrap_or(LogFormat::Compact);
        }
        if let Ok(path) = env::var("TRON_DEX_LOG_FILE") {
            config.log_file_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Log file under the user's home directory
    pub fn default_log_file() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".tron-dex");
        path.push("liquidity.log");
        path
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("tron_dex_sdk={}", self.level.as_filter())))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Error> {
    let builder = fmt()
        .with_env_filter(config.filter())
        .with_target(true);

    let result = match &config.log_file_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            match config.format {
                LogFormat::Compact => builder.compact().try_init(),
                LogFormat::Pretty => builder.pretty().try_init(),
                LogFormat::Json => builder.json().try_init(),
            }
        }
        None => {
            let builder = builder
                .with_ansi(config.enable_colors)
                .with_writer(std::io::stderr);
            match config.format {
                LogFormat::Compact => builder.compact().try_init(),
                LogFormat::Pretty => builder.pretty().try_init(),
                LogFormat::Json => builder.json().try_init(),
            }
        }
    };

    result.map_err(|e| Error::Other(format!("Failed to initialize logging: {}", e)))
}
