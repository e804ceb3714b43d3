use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather icon download and caching
    #[serde(default)]
    pub icons: IconConfig,

    /// Forecast data source and display
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconConfig {
    /// Base URL icons are resolved against (`<base_url><icon>.png`)
    #[serde(default = "default_icon_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on cached icons (0 = unbounded)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Retries for transient download failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/w/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_entries() -> usize {
    256
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_initial_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    format!("forecast/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            base_url: default_icon_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_entries: default_max_entries(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Offline forecast snapshot (JSON) used as the data source
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// strftime pattern for interval rows
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%m/%d (%a) %H:%M".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<Self, ConfigError> {
        Self::load()?.into_validated()
    }

    /// Validate an already loaded configuration, logging any warnings.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(self)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.icons.base_url, "icons.base_url", &mut result);
        if !self.icons.base_url.ends_with('/') {
            result.add_warning(
                "icons.base_url",
                "Base URL without a trailing '/' replaces its last path segment",
            );
        }

        if self.icons.request_timeout_secs == 0 {
            result.add_error(
                "icons.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.icons.request_timeout_secs > 120 {
            result.add_warning(
                "icons.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.icons.max_entries == 0 {
            result.add_warning("icons.max_entries", "Icon cache is unbounded");
        }

        if self.icons.retry_initial_delay_ms > self.icons.retry_max_delay_ms {
            result.add_error(
                "icons.retry_initial_delay_ms",
                "Initial retry delay exceeds the maximum delay",
            );
        }

        if self.forecast.date_format.trim().is_empty() {
            result.add_error("forecast.date_format", "Date format must not be empty");
        }

        match &self.forecast.snapshot_path {
            Some(path) if !path.exists() => {
                result.add_warning(
                    "forecast.snapshot_path",
                    format!("Path does not exist: {}", path.display()),
                );
            }
            Some(path) if !path.is_file() => {
                result.add_error(
                    "forecast.snapshot_path",
                    format!("Path is not a file: {}", path.display()),
                );
            }
            _ => {}
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("cannot serialize: {}", e)))?;

        std::fs::write(config_path, contents).map_err(|e| ConfigError::io(config_path, e))
    }

    /// `<config dir>/forecast/config.toml`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no user configuration directory".into()))?
            .join("forecast");

        Ok(config_dir.join("config.toml"))
    }
}
