use std::sync::Arc;

use skycast_core::{AppError, Config};
use skycast_history::HistoryStore;
use skycast_weather::WeatherProvider;

/// Application state shared across handlers
///
/// Holds the one history store of the process; every request goes through it
/// so its internal write lock covers all mutations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub history: Arc<HistoryStore>,
    pub weather: Arc<WeatherProvider>,
}

impl AppState {
    pub fn new(config: Config, history: HistoryStore, weather: WeatherProvider) -> Self {
        Self {
            config: Arc::new(config),
            history: Arc::new(history),
            weather: Arc::new(weather),
        }
    }

    /// Build the store and the weather client described by `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let history = HistoryStore::new(config.history.path.clone());
        let weather = WeatherProvider::new(&config.weather)?;

        tracing::info!("Search history stored at {}", history.path().display());
        Ok(Self::new(config, history, weather))
    }
}
