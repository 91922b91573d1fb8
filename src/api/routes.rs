//! Route table and handlers.
//!
//! Three GET routes, all stateless between requests: `/` identifies the
//! service, `/health` answers liveness without touching the browser, and
//! `/eurovision-odds` runs one full scrape cycle. CORS is wide open so
//! any frontend origin can consume the JSON directly.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ScrapeError;
use crate::scrape::scraper::{OddsScraper, OddsSnapshot};

#[derive(Clone)]
pub struct ApiState {
    pub scraper: Arc<OddsScraper>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/eurovision-odds", get(eurovision_odds))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn index() -> &'static str {
    "Eurovision odds service. GET /eurovision-odds for a live snapshot."
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

/// Liveness only; deliberately independent of whether scraping works.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Service is running",
    })
}

/// One isolated scrape per call. Failures map to a 500 with a structured
/// body via [`ScrapeError`]'s response conversion.
async fn eurovision_odds(
    State(state): State<ApiState>,
) -> Result<Json<OddsSnapshot>, ScrapeError> {
    let snapshot = state.scraper.take_snapshot().await?;
    Ok(Json(snapshot))
}
