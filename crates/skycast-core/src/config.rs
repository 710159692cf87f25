use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Upper bound on `weather.forecast_entries`; the OpenWeather forecast has 40
/// three-hour steps and the first one is reported as current conditions.
pub const MAX_FORECAST_ENTRIES: usize = 39;

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

    /// Get a summary of all errors
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
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// OpenWeather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Search history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory of the built client, served for any non-API path
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            static_dir: PathBuf::from("client/dist"),
        }
    }
}

/// Unit system requested from OpenWeather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    /// Kelvin, m/s
    Standard,
    /// Celsius, m/s
    #[default]
    Metric,
    /// Fahrenheit, mph
    Imperial,
}

impl TemperatureUnit {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(ConfigError::Invalid(format!("unknown unit system: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeather API key (usually supplied via OPENWEATHER_API_KEY)
    pub api_key: Option<String>,

    /// Base URL of the data API, e.g. `https://api.openweathermap.org/data/2.5`
    pub base_url: String,

    /// Base URL of the geocoding API
    pub geocode_url: String,

    /// Temperature unit preference
    pub temperature_unit: TemperatureUnit,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,

    /// Number of forecast steps returned after the current conditions
    pub forecast_entries: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            geocode_url: "https://api.openweathermap.org/geo/1.0".to_string(),
            temperature_unit: TemperatureUnit::Metric,
            timeout_secs: 10,
            forecast_entries: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON document holding the search history
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("searchHistory.json"),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any) and the environment.
    ///
    /// The file is `$SKYCAST_CONFIG` when set, otherwise
    /// `<config dir>/skycast/config.toml`. A missing default file means
    /// defaults; a missing `$SKYCAST_CONFIG` file is an error.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = lookup("SKYCAST_CONFIG").filter(|v| !v.trim().is_empty());

        let mut config = match explicit {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    return Err(ConfigError::MissingSetting(format!(
                        "SKYCAST_CONFIG points at {}, which does not exist",
                        path.display()
                    ))
                    .into());
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(&lookup)?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors; warnings are
    /// logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if a variable is present but unparsable.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(dir) = get("SKYCAST_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Some(key) = get("OPENWEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = get("OPENWEATHER_BASE_URL") {
            self.weather.base_url = url;
        }
        if let Some(url) = get("OPENWEATHER_GEO_URL") {
            self.weather.geocode_url = url;
        }
        if let Some(units) = get("OPENWEATHER_UNITS") {
            self.weather.temperature_unit = units.parse()?;
        }
        if let Some(path) = get("SKYCAST_HISTORY_PATH") {
            self.history.path = PathBuf::from(path);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.server.host.trim().is_empty() {
            result.add_error("server.host", "Host cannot be empty");
        }

        if !self.server.static_dir.is_dir() {
            result.add_warning(
                "server.static_dir",
                format!(
                    "Directory does not exist, no client will be served: {}",
                    self.server.static_dir.display()
                ),
            );
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.weather.geocode_url, "weather.geocode_url", &mut result);

        match self.weather.api_key.as_deref() {
            None => result.add_warning(
                "weather.api_key",
                "OpenWeather API key not configured - searches will fail",
            ),
            Some(key) if key.trim().is_empty() => {
                result.add_warning("weather.api_key", "OpenWeather API key is empty")
            }
            Some(_) => {}
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if self.weather.forecast_entries == 0 {
            result.add_warning("weather.forecast_entries", "Forecast disabled (0 entries)");
        } else if self.weather.forecast_entries > MAX_FORECAST_ENTRIES {
            result.add_error(
                "weather.forecast_entries",
                format!("At most {} forecast entries are available", MAX_FORECAST_ENTRIES),
            );
        }

        if self.history.path.as_os_str().is_empty() {
            result.add_error("history.path", "History path cannot be empty");
        } else if self.history.path.is_dir() {
            result.add_error(
                "history.path",
                format!("Path is a directory: {}", self.history.path.display()),
            );
        }

        result
    }

    /// Validate a URL field
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
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Get the path to the configuration file
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }
}
