use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gs_core::{Batch, Error};
use gs_news::NewsRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub exclude: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub articles: Batch,
}

/// Error body returned by both endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    fn from_error(err: Error, missing_key: &str, upstream_failed: &str) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = match err {
            Error::MissingCredential(_) => json!({ "error": missing_key }),
            other => json!({ "error": upstream_failed, "details": other.details() }),
        };
        Self { status, body }
    }

    fn news(err: Error) -> Self {
        Self::from_error(err, "Missing News API key in environment.", "Failed to fetch news from NewsAPI.")
    }

    fn weather(err: Error) -> Self {
        Self::from_error(
            err,
            "Missing OpenWeather API key in environment.",
            "Failed to fetch weather from OpenWeather.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsResponse>, ApiError> {
    let request = NewsRequest::from_query(
        query.exclude.as_deref(),
        query.page.as_deref(),
        query.page_size.as_deref(),
    );
    let articles = state.news.fetch(&request).await.map_err(ApiError::news)?;
    Ok(Json(NewsResponse { articles }))
}

pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, ApiError> {
    let data = state
        .weather
        .fetch(query.city.as_deref())
        .await
        .map_err(ApiError::weather)?;
    Ok(Json(data))
}
