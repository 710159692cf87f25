//! Forward geocoding: convert a city name to coordinates.
//! Uses the OpenWeather direct geocoding endpoint with the same API key.

use serde::Deserialize;

use crate::provider::WeatherProvider;
use crate::types::{Coordinates, WeatherError};

#[derive(Debug, Deserialize)]
struct GeocodeMatch {
    lat: f64,
    lon: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl WeatherProvider {
    /// Resolve `city` to coordinates using the best geocoding match.
    ///
    /// Returns `Ok(None)` if OpenWeather knows no place by that name.
    pub async fn resolve_city(&self, city: &str) -> Result<Option<Coordinates>, WeatherError> {
        let url = format!("{}/direct", self.geocode_url);
        let request = self
            .client
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.api_key()?)]);

        let matches: Vec<GeocodeMatch> = self.get_json(request).await?;

        let Some(best) = matches.into_iter().next() else {
            tracing::info!("No geocoding match for {:?}", city);
            return Ok(None);
        };

        tracing::debug!(
            "Geocoded {:?} to {}, {} ({}, {})",
            city,
            best.lat,
            best.lon,
            best.name.as_deref().unwrap_or("?"),
            best.country.as_deref().unwrap_or("?")
        );

        Ok(Some(Coordinates {
            lat: best.lat,
            lon: best.lon,
        }))
    }
}
