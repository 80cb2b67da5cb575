//! Tracing setup for famcal.
//!
//! Embedders call [`init_tracing`] once at startup. The engine configuration
//! carries a `[logging]` section that converts into a [`TracingConfig`]:
//!
//! ```ignore
//! use famcal_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! init_tracing(TracingConfig::default().with_format(TracingOutputFormat::Json))
//!     .expect("failed to initialize tracing");
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    /// Unknown level name in configuration
    #[error("unknown log level: {0}")]
    UnknownLevel(String),
}

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracingOutputFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Single-line format (default)
    #[default]
    Compact,
    /// JSON lines, for log shippers
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to `famcal` targets when `RUST_LOG` is not set
    pub default_level: Level,
    /// Output format
    pub output_format: TracingOutputFormat,
    /// Include file/line information
    pub include_location: bool,
    /// Include the module path
    pub include_target: bool,
    /// Custom env filter directive (overrides default_level if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Verbose settings for local debugging of drag/drop flows.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Pretty,
            include_location: true,
            ..Self::default()
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref filter) = self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("famcal={}", self.default_level))))
    }
}

/// Parses a level name such as `"debug"` or `"WARN"`.
///
/// # Errors
///
/// Returns [`TracingError::UnknownLevel`] for anything `tracing` does not know.
pub fn parse_level(name: &str) -> Result<Level, TracingError> {
    Level::from_str(name.trim()).map_err(|_| TracingError::UnknownLevel(name.to_string()))
}

/// Initialize tracing with the given configuration.
///
/// The `RUST_LOG` environment variable overrides the default level unless
/// an explicit filter is configured.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = config.build_filter()?;

    let layer = match config.output_format {
        TracingOutputFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(config.include_target)
            .boxed(),
        TracingOutputFormat::Compact => fmt::layer()
            .compact()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(config.include_target)
            .boxed(),
        TracingOutputFormat::Json => fmt::layer()
            .json()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_target(config.include_target)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_location);
        assert!(config.include_target);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_debug_config() {
        let config = TracingConfig::debug();
        assert_eq!(config.default_level, Level::DEBUG);
        assert_eq!(config.output_format, TracingOutputFormat::Pretty);
        assert!(config.include_location);
    }

    #[test]
    fn test_builder_methods() {
        let config = TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("famcal=trace");

        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter, Some("famcal=trace".to_string()));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
        assert!(matches!(
            parse_level("loud"),
            Err(TracingError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = TracingConfig::default().with_env_filter("famcal=verbose");
        assert!(matches!(
            config.build_filter(),
            Err(TracingError::EnvFilter(_))
        ));
    }

    #[test]
    fn test_format_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: TracingOutputFormat,
        }
        let parsed: Wrapper = serde_json::from_str(r#"{"format":"json"}"#).unwrap();
        assert_eq!(parsed.format, TracingOutputFormat::Json);
    }
}
