use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::error::PredictError;
use crate::predictor::Predictor;
use crate::teams;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

/// Build the Axum router for the prediction API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/predict", get(predict_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/team-comparison", get(comparison_handler))
        .route("/api/refresh-cache", post(refresh_cache_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// JSON error body with a status code. Internal failures never carry detail.
struct ApiError(StatusCode, String);

impl ApiError {
    fn bad_request(msg: impl Into<String>) -> Self {
        ApiError(StatusCode::BAD_REQUEST, msg.into())
    }

    fn internal(context: &str, detail: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, detail);
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        if e.is_client_error() {
            ApiError::bad_request(e.to_string())
        } else {
            ApiError::internal("Prediction failed", e)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct MatchupQuery {
    home: Option<String>,
    away: Option<String>,
    date: Option<String>,
}

impl MatchupQuery {
    fn teams(&self) -> Result<(String, String), ApiError> {
        let home = self
            .home
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing required parameter: home"))?;
        let away = self
            .away
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("Missing required parameter: away"))?;
        Ok((home, away))
    }

    /// An empty `date` means "use the default", same as leaving it out.
    fn date(&self) -> Option<String> {
        self.date.clone().filter(|s| !s.is_empty())
    }
}

/// Run blocking predictor work (SQLite, file reads) off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PredictError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal("Prediction failed", e))?
        .map_err(ApiError::from)
}

/// GET /
async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "message": "NBA Game Predictor API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/teams": "List all NBA teams",
            "GET /api/predict": "Predict game outcome (params: home, away, date)",
            "GET /api/team-comparison": "Per-metric comparison (params: home, away, date)",
            "GET /api/stats": "Model statistics",
            "POST /api/refresh-cache": "Clear the injury cache",
            "GET /health": "Health check"
        }
    }))
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (stats_entries, injury_entries) = state.predictor.cache_sizes();
    Json(json!({
        "status": "healthy",
        "model_loaded": true,
        "model_type": state.predictor.model_info().model_type,
        "cache": {
            "team_stats": stats_entries,
            "injuries": injury_entries,
        },
    }))
}

/// GET /api/teams
async fn teams_handler() -> impl IntoResponse {
    Json(json!({ "teams": teams::all_cities() }))
}

/// GET /api/predict?home=Boston&away=Miami&date=2025-04-14
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MatchupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (home, away) = q.teams()?;
    let predictor = state.predictor.clone();
    let date = q.date();
    let (prediction, actual) = blocking(move || {
        let p = predictor.predict(&home, &away, date.as_deref())?;
        let actual = predictor.recorded_winner(&home, &away, p.prediction_date)?;
        Ok((p, actual))
    })
    .await?;

    Ok(Json(json!({
        "winner": prediction.winner,
        "confidence": (prediction.confidence * 1000.0).round() / 10.0,
        "home_team": prediction.home_team,
        "away_team": prediction.away_team,
        "prediction_date": prediction.prediction_date.to_string(),
        "actual_winner": actual,
    })))
}

/// GET /api/stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.predictor.model_info())
}

/// GET /api/team-comparison?home=Boston&away=Miami
async fn comparison_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MatchupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (home, away) = q.teams()?;
    let predictor = state.predictor.clone();
    let date = q.date();
    let comparison =
        blocking(move || predictor.compare_teams(&home, &away, date.as_deref())).await?;
    Ok(Json(comparison))
}

/// POST /api/refresh-cache
async fn refresh_cache_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.predictor.invalidate_injury_cache();
    Json(json!({ "message": "Cache cleared successfully" }))
}

async fn not_found_handler() -> impl IntoResponse {
    ApiError(StatusCode::NOT_FOUND, "Endpoint not found".into())
}
