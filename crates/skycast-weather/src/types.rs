use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::{AppError, ConfigError, NetworkError};

/// Geographic coordinates of a resolved city
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Conditions at a single point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    /// OpenWeather icon code, e.g. `10d`
    pub icon: String,
    pub timestamp: DateTime<Utc>,
}

/// Current conditions plus the following forecast steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City as searched
    pub city: String,
    pub coordinates: Coordinates,
    pub current: Weather,
    pub forecast: Vec<Weather>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("City not found: {0}")]
    NotFound(String),
    #[error("OpenWeather rejected the API key")]
    InvalidApiKey,
    #[error("OpenWeather API key is not configured")]
    MissingApiKey,
    #[error("OpenWeather returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        use skycast_core::WeatherError as Core;

        match err {
            WeatherError::Network(e) => AppError::Network(e),
            WeatherError::NotFound(city) => AppError::Weather(Core::LocationNotFound(city)),
            WeatherError::InvalidApiKey => AppError::Weather(Core::InvalidApiKey),
            WeatherError::MissingApiKey => {
                AppError::Config(ConfigError::MissingSetting("OPENWEATHER_API_KEY".to_string()))
            }
            WeatherError::Upstream { status, .. } if status >= 500 => {
                AppError::Weather(Core::ServiceUnavailable)
            }
            WeatherError::Upstream { status, message } => {
                AppError::Weather(Core::ApiError(format!("{} - {}", status, message)))
            }
            WeatherError::Parse(message) => AppError::Network(NetworkError::InvalidResponse(message)),
        }
    }
}
