//! Configuration management for the BMKG client
//!
//! Handles loading configuration from an optional TOML file and `BMKG_`
//! environment variables, and validates the result.

use crate::BmkgError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the BMKG client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmkgConfig {
    /// Metric units (°C, km/h, km) instead of imperial
    #[serde(default = "default_metric")]
    pub metric: bool,
    /// English place names and labels instead of Indonesian
    #[serde(default)]
    pub english: bool,
    /// Feed endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// BMKG feed locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Directory holding the DigitalForecast documents
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_latest_earthquake_url")]
    pub latest_earthquake_url: String,
    #[serde(default = "default_recent_earthquakes_url")]
    pub recent_earthquakes_url: String,
    #[serde(default = "default_felt_earthquakes_url")]
    pub felt_earthquakes_url: String,
    #[serde(default = "default_latest_tsunami_url")]
    pub latest_tsunami_url: String,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_metric() -> bool {
    true
}

fn default_forecast_base_url() -> String {
    "https://data.bmkg.go.id/DataMKG/MEWS/DigitalForecast/".to_string()
}

fn default_latest_earthquake_url() -> String {
    "https://data.bmkg.go.id/DataMKG/TEWS/autogempa.xml".to_string()
}

fn default_recent_earthquakes_url() -> String {
    "https://data.bmkg.go.id/DataMKG/TEWS/gempaterkini.xml".to_string()
}

fn default_felt_earthquakes_url() -> String {
    "https://data.bmkg.go.id/DataMKG/TEWS/gempadirasakan.xml".to_string()
}

fn default_latest_tsunami_url() -> String {
    "https://data.bmkg.go.id/lasttsunami.xml".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("bmkg-rs/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            latest_earthquake_url: default_latest_earthquake_url(),
            recent_earthquakes_url: default_recent_earthquakes_url(),
            felt_earthquakes_url: default_felt_earthquakes_url(),
            latest_tsunami_url: default_latest_tsunami_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for BmkgConfig {
    fn default() -> Self {
        Self {
            metric: default_metric(),
            english: false,
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BmkgConfig {
    /// Load configuration from `bmkg.toml` (if present) and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("bmkg.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. BMKG_METRIC=false or BMKG_HTTP__TIMEOUT_SECONDS=10
        builder = builder.add_source(
            Environment::with_prefix("BMKG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: BmkgConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        let endpoints = &mut self.endpoints;
        if endpoints.forecast_base_url.is_empty() {
            endpoints.forecast_base_url = default_forecast_base_url();
        }
        if endpoints.latest_earthquake_url.is_empty() {
            endpoints.latest_earthquake_url = default_latest_earthquake_url();
        }
        if endpoints.recent_earthquakes_url.is_empty() {
            endpoints.recent_earthquakes_url = default_recent_earthquakes_url();
        }
        if endpoints.felt_earthquakes_url.is_empty() {
            endpoints.felt_earthquakes_url = default_felt_earthquakes_url();
        }
        if endpoints.latest_tsunami_url.is_empty() {
            endpoints.latest_tsunami_url = default_latest_tsunami_url();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_endpoints()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_endpoints(&self) -> Result<()> {
        let endpoints = [
            ("forecast_base_url", &self.endpoints.forecast_base_url),
            ("latest_earthquake_url", &self.endpoints.latest_earthquake_url),
            ("recent_earthquakes_url", &self.endpoints.recent_earthquakes_url),
            ("felt_earthquakes_url", &self.endpoints.felt_earthquakes_url),
            ("latest_tsunami_url", &self.endpoints.latest_tsunami_url),
        ];

        for (name, url) in endpoints {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(BmkgError::config(format!(
                    "Endpoint '{name}' must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        if !self.endpoints.forecast_base_url.ends_with('/') {
            return Err(BmkgError::config("Forecast base URL must end with '/'").into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(BmkgError::config("HTTP timeout cannot exceed 300 seconds").into());
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(BmkgError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(BmkgError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
