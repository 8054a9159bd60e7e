//! Web boundary: HTML index page plus JSON rate endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::Result;
use crate::service::RateService;

pub fn router(service: Arc<RateService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/rates", get(list_rates))
        .route("/api/rate/:code", get(get_rate))
        .route("/api/refresh", post(refresh_rates))
        .with_state(service)
}

/// Run the server until the process is stopped. Fetches an initial
/// snapshot when none exists; a failure there is logged, not fatal, and
/// the endpoints report data-not-available until a refresh succeeds.
pub async fn serve(service: Arc<RateService>, bind: &str) -> Result<()> {
    if let Err(e) = service.ensure_snapshot().await {
        error!("Initial rate fetch failed: {e:#}");
    }

    let app = router(service);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Rate server listening on http://{bind}");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

async fn list_rates(State(service): State<Arc<RateService>>) -> (StatusCode, Json<Value>) {
    match service.list() {
        Ok(quotes) => (StatusCode::OK, Json(json!(quotes))),
        Err(e) => {
            error!("Failed to load rates: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Exchange rate data not available" })),
            )
        }
    }
}

async fn get_rate(
    State(service): State<Arc<RateService>>,
    Path(code): Path<String>,
) -> (StatusCode, Json<Value>) {
    match service.lookup(&code) {
        Ok(Some(rate)) => (StatusCode::OK, Json(json!({ "rate": rate }))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Currency {code} not found") })),
        ),
        Err(e) => {
            error!("Failed to look up {code}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Exchange rate data not available" })),
            )
        }
    }
}

async fn refresh_rates(State(service): State<Arc<RateService>>) -> (StatusCode, Json<Value>) {
    match service.refresh().await {
        Ok(currencies) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Exchange rates refreshed successfully",
                "currencies": currencies,
            })),
        ),
        Err(e) => {
            error!("Refresh failed: {e:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "message": format!("{e:#}") })),
            )
        }
    }
}
