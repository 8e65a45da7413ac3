use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use metar_core::{MetarError, MetarSource, StationCode, WeatherReport, fetch_report};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::page;

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn MetarSource>,
}

pub fn router(source: Arc<dyn MetarSource>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get-weather", post(get_weather))
        .route("/api/weather/:code", get(api_weather))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { source })
}

pub async fn run(host: &str, port: u16, source: Arc<dyn MetarSource>) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind web server to {addr}"))?;

    info!("Web server running at http://{addr}");
    axum::serve(listener, router(source)).await.context("Web server stopped unexpectedly")
}

async fn index() -> Html<String> {
    Html(page::index())
}

#[derive(Debug, Deserialize)]
struct WeatherForm {
    #[serde(default)]
    airport_code: String,
}

async fn get_weather(State(state): State<AppState>, Form(form): Form<WeatherForm>) -> Html<String> {
    let result = match StationCode::parse(&form.airport_code) {
        Ok(station) => fetch_report(state.source.as_ref(), &station).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(report) => {
            info!(station = %report.airport_code, "rendered weather page");
            Html(page::report(&report))
        }
        Err(err) => Html(page::error(&err.user_message())),
    }
}

async fn api_weather(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<WeatherReport>, ApiError> {
    let station = StationCode::parse(&code)?;
    let report = fetch_report(state.source.as_ref(), &station).await?;

    info!(%station, "served weather API request");
    Ok(Json(report))
}

/// JSON error body with a status derived from the error kind.
struct ApiError(MetarError);

impl From<MetarError> for ApiError {
    fn from(err: MetarError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MetarError::NoData { .. } => StatusCode::NOT_FOUND,
            MetarError::InvalidStation { .. } => StatusCode::BAD_REQUEST,
            MetarError::MalformedReport { .. } | MetarError::UpstreamUnavailable { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}
