//! API routes for dispatchd.

use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dispatch_common::{Comment, Tech, Ticket};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Predict Routes
// ============================================================================

/// Incoming ticket payload. Absent optional fields are treated as empty,
/// never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub subject: String,
    #[serde(default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
}

impl PredictRequest {
    fn into_ticket(self) -> Ticket {
        Ticket {
            number: None,
            subject: self.subject,
            problem_type: self.problem_type,
            comments: self.comments.unwrap_or_default(),
            user: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub tech: Option<Tech>,
    pub confidence: f64,
}

pub fn predict_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/predict/dispatch", post(predict_dispatch))
}

/// Predict the tech to dispatch a ticket to.
///
/// A failure here is scoped to this request: the model is read-only, so
/// nothing shared can be left in a bad state.
async fn predict_dispatch(
    State(state): State<AppStateArc>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    let ticket = req.into_ticket();

    match state.predictor.predict(&ticket) {
        Ok(prediction) => {
            info!(
                "  Predicted {} (confidence {:.2}) for '{}'",
                prediction
                    .tech
                    .map(|t| t.as_str())
                    .unwrap_or("<unknown>"),
                prediction.confidence,
                ticket.subject
            );
            Ok(Json(PredictResponse {
                tech: prediction.tech,
                confidence: prediction.confidence,
            }))
        }
        Err(e) => {
            error!("  Prediction failed for '{}': {}", ticket.subject, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_classes: Vec<String>,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_classes: state.predictor.classes().to_vec(),
    })
}
