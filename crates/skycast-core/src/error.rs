//! Centralized error types for Skycast.
//!
//! Each failure domain has its own enum with a `user_message()` that is safe
//! to hand back to API clients. Full detail stays in the `Display` output for
//! logging.

use skycast_history::HistoryError;
use thiserror::Error;

/// Top-level application error type.
///
/// All errors surfaced by the HTTP layer should be convertible to this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    /// Bad input from the caller.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns a message suitable for API clients.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Validation(_) => "The request was invalid.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to reach the weather service.",
            NetworkError::Timeout => "The weather service timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The weather request failed.",
            NetworkError::InvalidResponse(_) => "Received an unexpected response from the weather service.",
        }
    }
}

/// Search history storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "Unable to save search history.",
            StorageError::Corruption(_) => "Search history is damaged and could not be updated.",
        }
    }
}

impl From<HistoryError> for StorageError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Corrupt { .. } => StorageError::Corruption(err.to_string()),
            HistoryError::Persistence { .. } | HistoryError::Serialize(_) => {
                StorageError::Unavailable(err.to_string())
            }
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::Storage(err.into())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Weather lookup errors as seen by the rest of the application.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "City not found",
            WeatherError::ApiError(_) => "Unable to retrieve weather data",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Storage(StorageError::Unavailable("disk".into())),
            AppError::Config(ConfigError::Invalid("test".into())),
            AppError::Weather(WeatherError::ServiceUnavailable),
            AppError::validation("city"),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "empty message for {:?}", err);
        }
    }

    #[test]
    fn test_history_error_conversion() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: AppError = HistoryError::Corrupt {
            path: "searchHistory.json".into(),
            source,
        }
        .into();
        assert!(matches!(err, AppError::Storage(StorageError::Corruption(_))));

        let err: AppError = HistoryError::Persistence {
            path: "searchHistory.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(matches!(err, AppError::Storage(StorageError::Unavailable(_))));
        assert!(err.to_string().contains("searchHistory.json"));
    }

    #[test]
    fn test_user_message_propagation() {
        let err = AppError::Weather(WeatherError::LocationNotFound("Atlantis".into()));
        assert_eq!(err.user_message(), "City not found");
    }

    #[test]
    fn test_storage_errors_do_not_leak_detail() {
        let err = AppError::Storage(StorageError::Unavailable("/secret/path".into()));
        assert!(!err.user_message().contains("/secret"));
    }
}
