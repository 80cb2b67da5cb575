//! Engine configuration.
//!
//! All settings live in a single `config.toml`, by default at
//! `~/.config/famcal/config.toml`:
//!
//! ```toml
//! [backend]
//! base_url = "https://family.example.com/api"
//! timeout_secs = 10
//!
//! [conflicts]
//! policy = "fail_open"
//! max_reschedule_attempts = 3
//!
//! [history]
//! max_depth = 100
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use famcal_backend::HttpBackendConfig;
use famcal_core::tracing::{TracingConfig, TracingOutputFormat, parse_level};

use crate::conflict::ConflictPolicy;
use crate::error::{EngineError, EngineResult};

/// Configuration for the rescheduling engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// REST backend settings.
    pub backend: BackendSettings,

    /// Conflict handling.
    pub conflicts: ConflictSettings,

    /// Undo/redo history.
    pub history: HistorySettings,

    /// Notice fan-out.
    pub notifier: NotifierSettings,

    /// Log output.
    pub logging: LoggingSettings,

    /// Resize limits.
    pub resize: ResizeSettings,
}

/// REST backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the family calendar API.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Bearer token.
    pub auth_token: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: HttpBackendConfig::DEFAULT_TIMEOUT_SECS,
            auth_token: None,
        }
    }
}

impl BackendSettings {
    /// Builds the HTTP client configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is missing or invalid.
    pub fn http_config(&self) -> EngineResult<HttpBackendConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| EngineError::config("backend.base_url is not set"))?;
        let mut config = HttpBackendConfig::new(base_url)
            .map_err(|e| EngineError::config(e.to_string()))?
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref token) = self.auth_token {
            config = config.with_auth_token(token);
        }
        Ok(config)
    }
}

/// Conflict handling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictSettings {
    /// What to do when the conflict check fails.
    pub policy: ConflictPolicy,

    /// How many alternative positions one drop may try.
    pub max_reschedule_attempts: u32,
}

impl Default for ConflictSettings {
    fn default() -> Self {
        Self {
            policy: ConflictPolicy::FailOpen,
            max_reschedule_attempts: 3,
        }
    }
}

/// Undo/redo history settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum undo depth; unbounded when unset.
    pub max_depth: Option<usize>,
}

/// Notice fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    /// Notices a slow subscriber may lag behind before losing some.
    pub channel_capacity: usize,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for famcal targets (`trace` .. `error`).
    pub level: String,

    /// Output format.
    pub format: TracingOutputFormat,

    /// Full env-filter directive, overriding `level`.
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingOutputFormat::Compact,
            filter: None,
        }
    }
}

impl LoggingSettings {
    /// Converts to a tracing configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown level name.
    pub fn tracing_config(&self) -> EngineResult<TracingConfig> {
        let level = parse_level(&self.level).map_err(|e| EngineError::config(e.to_string()))?;
        let mut config = TracingConfig::default()
            .with_level(level)
            .with_format(self.format);
        if let Some(ref filter) = self.filter {
            config = config.with_env_filter(filter);
        }
        Ok(config)
    }
}

/// Resize limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    /// Shortest duration a resize may produce.
    pub min_duration_minutes: u32,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            min_duration_minutes: 15,
        }
    }
}

impl ResizeSettings {
    pub fn min_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.min_duration_minutes))
    }
}

impl EngineConfig {
    /// Loads configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> EngineResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file cannot be read and
    /// [`EngineError::Config`] if it does not parse or validate.
    pub fn load_from(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_with_origin(&content, &path.display().to_string())
    }

    /// Parses and validates TOML content.
    pub fn parse(content: &str) -> EngineResult<Self> {
        Self::parse_with_origin(content, "config")
    }

    fn parse_with_origin(content: &str, origin: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| EngineError::config(format!("failed to parse {}: {}", origin, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot express.
    pub fn validate(&self) -> EngineResult<()> {
        if self.backend.timeout_secs == 0 {
            return Err(EngineError::config("backend.timeout_secs must be positive"));
        }
        if self.notifier.channel_capacity == 0 {
            return Err(EngineError::config("notifier.channel_capacity must be positive"));
        }
        if self.history.max_depth == Some(0) {
            return Err(EngineError::config("history.max_depth must be positive"));
        }
        parse_level(&self.logging.level).map_err(|e| EngineError::config(e.to_string()))?;
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("famcal")
    }
}
