use crate::infra::AppState;
use admit_ai::error::AppError;
use admit_ai::workflows::entry::{read_entries, EntryOptions, RubricReport};
use admit_ai::workflows::portfolio::{portfolio_router, PortfolioEvaluator};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct EntryBatchRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) options: EntryOptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct EntryBatchItem {
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) report: RubricReport,
}

pub(crate) fn with_portfolio_routes(evaluator: Arc<PortfolioEvaluator>) -> Router {
    let batch = Router::new()
        .route("/api/v1/entries/batch", post(entry_batch_endpoint))
        .with_state(evaluator.clone());

    portfolio_router(evaluator)
        .merge(batch)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Score every row of an `id,title,description` CSV body.
pub(crate) async fn entry_batch_endpoint(
    State(evaluator): State<Arc<PortfolioEvaluator>>,
    Json(request): Json<EntryBatchRequest>,
) -> Result<Json<Vec<EntryBatchItem>>, AppError> {
    let entries = read_entries(Cursor::new(request.csv.into_bytes()))?;

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let report = evaluator
            .score_entry(&entry.description, &request.options)
            .await;
        items.push(EntryBatchItem {
            id: entry.id,
            title: entry.title,
            report,
        });
    }

    Ok(Json(items))
}
