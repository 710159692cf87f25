use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use skycast_core::{AppError, WeatherError};

/// Handler error: an `AppError` rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Weather(WeatherError::LocationNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Weather(_) | AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            AppError::Validation(message) => message.clone(),
            other => other.user_message().to_string(),
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }

        (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}
