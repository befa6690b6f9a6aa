//! API route handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tidecast_models::error::PipelineError;
use tidecast_models::regions::known_seas;

use crate::server::AppState;
use crate::startup::render;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

fn error_response(status: StatusCode, error: &str, details: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

/// Liveness probe. Does not look at the ensemble.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "ML server is running"
    }))
}

pub async fn seas() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "seas": known_seas() }))
}

/// Why a prediction request did not produce a body.
#[derive(Debug)]
enum PredictFailure {
    Rejected(PipelineError),
    Internal(String),
}

impl From<PipelineError> for PredictFailure {
    fn from(e: PipelineError) -> Self {
        PredictFailure::Rejected(e)
    }
}

impl From<serde_json::Error> for PredictFailure {
    fn from(e: serde_json::Error) -> Self {
        PredictFailure::Internal(e.to_string())
    }
}

/// `GET /predict/:sea/:year`
///
/// Non-integer years never get here: the `Path` extractor rejects them.
/// Inference runs on the blocking pool.
pub async fn predict(
    State(state): State<AppState>,
    Path((sea, year)): Path<(String, u32)>,
) -> Response {
    log::debug!("Received request for sea: {}, year: {}", sea, year);

    let Ok(target_year) = i32::try_from(year) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid prediction range",
            format!("year {} is out of range", year),
        );
    };

    let pipeline = Arc::clone(&state.pipeline);
    let shape = state.shape;
    let task_sea = sea.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<String, PredictFailure> {
        let result = pipeline.predict(&task_sea, target_year)?;
        Ok(render(&result, shape)?)
    })
    .await
    .unwrap_or_else(|e| Err(PredictFailure::Internal(e.to_string())));

    prediction_response(&sea, year, outcome)
}

fn prediction_response(sea: &str, year: u32, outcome: Result<String, PredictFailure>) -> Response {
    match outcome {
        Ok(body) => {
            log::debug!("Prediction result for {} {}: {}", sea, year, body);
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(PredictFailure::Rejected(e)) => {
            log::warn!("Rejected request for sea: {}, year: {}: {}", sea, year, e);
            error_response(StatusCode::BAD_REQUEST, "Invalid prediction range", e.to_string())
        }
        Err(PredictFailure::Internal(details)) => {
            log::error!("Endpoint error for sea: {}, year: {}: {}", sea, year, details);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process ML prediction",
                details,
            )
        }
    }
}
