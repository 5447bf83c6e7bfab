use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Dimension, Portfolio};
use super::service::{EvaluationError, PortfolioEvaluator};
use crate::workflows::entry::EntryOptions;

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub portfolio: Portfolio,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryScoreRequest {
    pub text: String,
    #[serde(default)]
    pub options: EntryOptions,
}

/// Router builder exposing portfolio evaluation and entry scoring.
pub fn portfolio_router(evaluator: Arc<PortfolioEvaluator>) -> Router {
    Router::new()
        .route("/api/v1/portfolio/evaluations", post(evaluate_handler))
        .route(
            "/api/v1/portfolio/dimensions/:dimension",
            post(dimension_handler),
        )
        .route("/api/v1/entries/score", post(entry_handler))
        .with_state(evaluator)
}

fn requested_mode(evaluator: &PortfolioEvaluator, mode: Option<String>) -> String {
    mode.unwrap_or_else(|| evaluator.default_mode().key().to_string())
}

pub(crate) async fn evaluate_handler(
    State(evaluator): State<Arc<PortfolioEvaluator>>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response {
    let mode = requested_mode(&evaluator, request.mode);
    match evaluator.evaluate_portfolio(&request.portfolio, &mode).await {
        Ok(synthesis) => (StatusCode::OK, axum::Json(synthesis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dimension_handler(
    State(evaluator): State<Arc<PortfolioEvaluator>>,
    Path(dimension): Path<String>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response {
    let dimension = match dimension.parse::<Dimension>() {
        Ok(dimension) => dimension,
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    let mode = requested_mode(&evaluator, request.mode);
    match evaluator
        .evaluate_dimension(&request.portfolio, dimension, &mode)
        .await
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn entry_handler(
    State(evaluator): State<Arc<PortfolioEvaluator>>,
    axum::Json(request): axum::Json<EntryScoreRequest>,
) -> Response {
    let report = evaluator.score_entry(&request.text, &request.options).await;
    (StatusCode::OK, axum::Json(report)).into_response()
}

fn error_response(error: EvaluationError) -> Response {
    let status = match &error {
        EvaluationError::Configuration(_) => StatusCode::BAD_REQUEST,
        EvaluationError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
