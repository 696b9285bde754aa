//! Logging infrastructure for Agency Directory
//!
//! This module provides centralized logging configuration using the
//! tracing ecosystem.

use agency_core::config::{LogFormat, LoggingSettings};
use agency_core::{DirectoryError, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl From<&LoggingSettings> for LoggerConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            json_format: settings.format == LogFormat::Json,
            with_timestamps: settings.timestamps,
            with_file_info: settings.file_info,
        }
    }
}

/// Initialize the global logger with the given configuration
///
/// `RUST_LOG` directives are honored on top of the configured level.
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let level = parse_level(&config.level)?;

    let env_filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive(quiet("hyper")?)
        .add_directive(quiet("reqwest")?)
        .add_directive(quiet("h2")?);

    let fmt_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .boxed()
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info);

        if config.with_timestamps {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| DirectoryError::validation(format!("Failed to initialize logger: {}", e)))?;

    tracing::info!("Logger initialized with level: {}", config.level);
    Ok(())
}

/// Initialize logger for testing (reduces noise)
pub fn init_test_logger() -> Result<()> {
    let config = LoggerConfig {
        level: "warn".to_string(),
        json_format: false,
        with_timestamps: false,
        with_file_info: false,
    };

    // Ignore errors if already initialized
    let _ = init_logger(config);
    Ok(())
}

/// Parse log level from string
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level)
        .map_err(|e| DirectoryError::validation(format!("Invalid log level '{}': {}", level, e)))
}

fn quiet(target: &str) -> Result<tracing_subscriber::filter::Directive> {
    format!("{}=warn", target)
        .parse()
        .map_err(|e| DirectoryError::validation(format!("Invalid log directive: {}", e)))
}
