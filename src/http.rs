//! HTTP surface: routing, shared state and the prediction endpoint.

use crate::error::AppError;
use crate::risk::predict::{Prediction, PredictionError, RiskPredictor};
use crate::risk::supplier::SupplierRecord;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Immutable per-process state shared across requests.
///
/// The predictor is loaded once at startup and never mutated afterwards,
/// so concurrent requests need no locking.
#[derive(Clone)]
pub struct AppState {
    predictor: Arc<Option<RiskPredictor>>,
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(
        predictor: Option<RiskPredictor>,
        readiness: Arc<AtomicBool>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            predictor: Arc::new(predictor),
            readiness,
            metrics,
        }
    }
}

/// Builds the service router. The caller attaches the metrics layer so the
/// prometheus pair stays under its control.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/predict", post(predict_endpoint))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// The body is read raw and parsed explicitly: the documented 400 payloads
/// belong to this service, not to the framework's extractor rejections.
///
/// A missing, unparseable, null or empty-object body is "no input"; a
/// non-empty body with a field that fails to coerce reports the field error
/// instead, so callers can tell a typo from a missing body.
async fn predict_endpoint(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Prediction>, AppError> {
    let predictor = state
        .predictor
        .as_ref()
        .as_ref()
        .ok_or(PredictionError::ModelNotLoaded)?;

    let json: serde_json::Value =
        serde_json::from_str(body.trim()).map_err(|_| PredictionError::EmptyInput)?;
    if json.is_null() || json.as_object().is_some_and(|map| map.is_empty()) {
        return Err(PredictionError::EmptyInput.into());
    }

    let record: SupplierRecord = serde_json::from_value(json)
        .map_err(|err| PredictionError::InvalidInput(err.to_string()))?;

    let prediction = predictor.predict(&record)?;
    Ok(Json(prediction))
}
