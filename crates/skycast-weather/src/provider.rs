use chrono::DateTime;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skycast_core::{ReqwestErrorExt, TemperatureUnit, WeatherConfig};
use std::sync::Arc;
use std::time::Duration;

use crate::types::{Coordinates, Weather, WeatherError, WeatherReport};

pub(crate) const USER_AGENT: &str = concat!("Skycast/", env!("CARGO_PKG_VERSION"));

/// OpenWeather client
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    pub(crate) client: Arc<Client>,
    pub(crate) base_url: String,
    pub(crate) geocode_url: String,
    pub(crate) api_key: Option<String>,
    unit: TemperatureUnit,
    forecast_entries: usize,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geocode_url: config.geocode_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            unit: config.temperature_unit,
            forecast_entries: config.forecast_entries,
        })
    }

    /// Look up `city` and fetch its weather.
    ///
    /// # Errors
    /// Returns `WeatherError::NotFound` if geocoding finds no match, or any
    /// error from [`fetch_forecast`](Self::fetch_forecast).
    pub async fn weather_for_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let coordinates = self
            .resolve_city(city)
            .await?
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))?;

        let mut report = self.fetch_forecast(coordinates).await?;
        report.city = city.to_string();
        Ok(report)
    }

    /// Fetch current conditions and the next forecast steps at `coordinates`.
    ///
    /// The returned report's `city` is empty; `weather_for_city` fills it in.
    pub async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let request = self.client.get(&url).query(&[
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("appid", self.api_key()?.to_string()),
            ("units", self.unit.as_query().to_string()),
        ]);

        let body: ForecastResponse = self.get_json(request).await?;
        let report = shape_report(coordinates, body, self.forecast_entries)?;

        tracing::info!(
            "Fetched weather at {}, {} ({} forecast entries)",
            coordinates.lat,
            coordinates.lon,
            report.forecast.len()
        );
        Ok(report)
    }

    pub(crate) fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)
    }

    /// Send `request` and decode a successful JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, WeatherError> {
        let response = request
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(WeatherError::InvalidApiKey);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("OpenWeather returned status {}: {}", status, message);
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: i64,
    main: ForecastMain,
    wind: ForecastWind,
    weather: Vec<ForecastCondition>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ForecastWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastCondition {
    description: String,
    icon: String,
}

impl TryFrom<ForecastItem> for Weather {
    type Error = WeatherError;

    fn try_from(item: ForecastItem) -> Result<Self, Self::Error> {
        let condition = item
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse(format!("forecast entry {} has no conditions", item.dt)))?;
        let timestamp = DateTime::from_timestamp(item.dt, 0)
            .ok_or_else(|| WeatherError::Parse(format!("invalid timestamp {}", item.dt)))?;

        Ok(Weather {
            temperature: item.main.temp,
            humidity: item.main.humidity,
            wind_speed: item.wind.speed,
            description: condition.description,
            icon: condition.icon,
            timestamp,
        })
    }
}

/// First entry is the current conditions, the next `forecast_entries` are the forecast.
fn shape_report(
    coordinates: Coordinates,
    body: ForecastResponse,
    forecast_entries: usize,
) -> Result<WeatherReport, WeatherError> {
    let mut items = body.list.into_iter();
    let first = items
        .next()
        .ok_or_else(|| WeatherError::Parse("forecast contained no entries".to_string()))?;
    let current = Weather::try_from(first)?;

    let forecast = items
        .take(forecast_entries)
        .map(Weather::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherReport {
        city: String::new(),
        coordinates,
        current,
        forecast,
    })
}
