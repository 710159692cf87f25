//! Weather service for Skycast
//!
//! Resolves city names to coordinates and fetches current conditions plus a
//! short forecast from the OpenWeather API.

pub mod geocode;
pub mod provider;
pub mod types;

pub use provider::WeatherProvider;
pub use types::*;
