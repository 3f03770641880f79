use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error};

use crate::engine::situation::parse_quarter;
use crate::engine::{
    evaluate_input, DecisionMetrics, Detail, EngineContext, EngineError, Evaluation, ModelStatus,
    SituationInput,
};

/// Build the Axum router for the decision API.
pub fn router(context: Arc<EngineContext>) -> Router {
    Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(context)
}

// ── Request ──────────────────────────────────────────────────────────────────

fn default_yardline() -> i64 {
    50
}
fn default_yards_to_go() -> i64 {
    10
}
fn default_quarter() -> Value {
    Value::String("4th".into())
}
fn default_time_remaining() -> String {
    "0:00".into()
}
fn default_kicker_range() -> u32 {
    50
}
fn default_punter_range() -> u32 {
    45
}
fn default_field_position() -> String {
    "own".into()
}

/// POST /api/calculate body. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[serde(default = "default_yardline", alias = "currentYardline")]
    pub yardline: i64,
    #[serde(default = "default_yards_to_go")]
    pub yards_to_go: i64,
    /// A label like "3rd" or a bare number.
    #[serde(default = "default_quarter")]
    pub quarter: Value,
    #[serde(default = "default_time_remaining")]
    pub time_remaining: String,
    #[serde(default, alias = "scoreDifferential")]
    pub score_diff: i32,
    #[serde(default = "default_kicker_range")]
    pub kicker_range: u32,
    #[serde(default = "default_punter_range")]
    pub punter_range: u32,
    #[serde(default = "default_field_position", alias = "ballSide")]
    pub field_position: String,
}

impl CalculateRequest {
    /// Unrecognised quarter labels are read as the 4th.
    pub fn to_input(&self) -> SituationInput {
        let label = match &self.quarter {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        let quarter = if parse_quarter(&label).is_ok() {
            label
        } else {
            "4".to_string()
        };
        SituationInput {
            yardline: self.yardline,
            side: self.field_position.clone(),
            distance_to_gain: self.yards_to_go,
            quarter,
            clock: self.time_remaining.clone(),
            score_differential: self.score_diff,
            kicker_range_yards: self.kicker_range,
            punter_range_yards: self.punter_range,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    pub td_prob: f64,
    pub fg_prob: f64,
    pub no_score_prob: f64,
    pub wpa: f64,
}

impl From<&DecisionMetrics> for OutcomeSummary {
    fn from(m: &DecisionMetrics) -> Self {
        OutcomeSummary {
            td_prob: round1(m.td_prob),
            fg_prob: round1(m.fg_prob),
            no_score_prob: round1(m.no_score_prob),
            wpa: round1(m.wpa),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuntSummary {
    pub net_td_prob: f64,
    pub score_prob: f64,
    pub win_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub decision: String,
    pub wpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateResponse {
    pub go: OutcomeSummary,
    pub fg: OutcomeSummary,
    pub punt: PuntSummary,
    pub recommendation: RecommendationSummary,
}

impl From<&Evaluation> for CalculateResponse {
    fn from(eval: &Evaluation) -> Self {
        let (score_prob, win_prob) = match eval.punt.detail {
            Detail::Punt {
                score_prob,
                win_prob,
                ..
            } => (score_prob, win_prob),
            _ => (eval.punt.td_prob + eval.punt.fg_prob, eval.punt.wpa * 100.0),
        };
        CalculateResponse {
            go: OutcomeSummary::from(&eval.go),
            fg: OutcomeSummary::from(&eval.field_goal),
            punt: PuntSummary {
                net_td_prob: round1(eval.punt.td_prob),
                score_prob: round1(score_prob),
                win_prob: round1(win_prob),
            },
            recommendation: RecommendationSummary {
                decision: eval.recommendation.decision.to_string(),
                wpa: round1(eval.recommendation.wpa),
            },
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Input errors and unreadable bodies are the caller's fault; anything else
/// means the engine could not answer.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    Body(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) if !e.is_input_error() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Engine(e) => e.to_string(),
            ApiError::Body(msg) => msg.clone(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            error!("Engine unavailable: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/calculate
async fn calculate_handler(
    State(context): State<Arc<EngineContext>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(request) = payload?;
    debug!("calculate {:?}", request);
    let evaluation = evaluate_input(&context, &request.to_input())?;
    Ok(Json(CalculateResponse::from(&evaluation)))
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: ModelStatus,
}

/// GET /api/health
async fn health_handler(State(context): State<Arc<EngineContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: context.model_status(),
    })
}
