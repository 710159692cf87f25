use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use skycast_core::AppError;
use skycast_history::HistoryEntry;
use skycast_weather::WeatherReport;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub weather_data: WeatherReport,
    pub city_entry: HistoryEntry,
}

/// Build the application router.
///
/// API routes take precedence; anything else is looked up in the static
/// client directory.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/weather", post(search))
        .route("/api/weather/history", get(list_history))
        .route("/api/weather/history/:id", delete(delete_history))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Look up the weather for a city and record the search.
///
/// The city is only recorded once the weather lookup has succeeded.
async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let city = request
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::validation("City name is required"))?;

    let weather_data = state.weather.weather_for_city(&city).await?;
    let city_entry = state.history.append(&city).await?;

    Ok(Json(SearchResponse {
        weather_data,
        city_entry,
    }))
}

async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

/// Remaining history, or `null` when no entry had that id.
async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Vec<HistoryEntry>>>, ApiError> {
    let remaining = state.history.remove_by_id(&id).await?;
    Ok(Json(remaining))
}
