use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::portfolio::router::{dimension_handler, EvaluationRequest};
use crate::workflows::portfolio::{portfolio_router, OfflineReasoningClient};

fn post_json(uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn evaluation_route_returns_synthesis() {
    let router = portfolio_router(Arc::new(evaluator(Arc::new(StageClient::new(
        scenario_scores(),
    )))));

    let response = router
        .oneshot(post_json(
            "/api/v1/portfolio/evaluations",
            json!({ "portfolio": portfolio(), "mode": "general" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(json_body(&payload, "/overall_score"), json!(7.4));
    assert_eq!(json_body(&payload, "/tier"), json!("strong"));
    assert_eq!(json_body(&payload, "/percentile_bucket"), json!("top_10"));
    assert_eq!(
        json_body(&payload, "/dimensions/academics/path"),
        json!("primary")
    );
}

#[tokio::test]
async fn evaluation_route_uses_default_mode_when_omitted() {
    let evaluator = evaluator(Arc::new(OfflineReasoningClient))
        .with_default_mode(crate::workflows::portfolio::EvaluationMode::UcDavis);
    let router = portfolio_router(Arc::new(evaluator));

    let response = router
        .oneshot(post_json(
            "/api/v1/portfolio/evaluations",
            json!({ "portfolio": portfolio() }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(json_body(&payload, "/mode"), json!("uc_davis"));
}

#[tokio::test]
async fn unknown_mode_maps_to_bad_request() {
    let router = portfolio_router(Arc::new(evaluator(Arc::new(OfflineReasoningClient))));

    let response = router
        .oneshot(post_json(
            "/api/v1/portfolio/evaluations",
            json!({ "portfolio": portfolio(), "mode": "stanford" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap().contains("stanford"));
}

#[tokio::test]
async fn portfolio_without_any_writing_is_unprocessable() {
    let router = portfolio_router(Arc::new(evaluator(Arc::new(OfflineReasoningClient))));
    let mut incomplete = portfolio();
    incomplete.essays.clear();
    incomplete.activities.clear();

    let response = router
        .oneshot(post_json(
            "/api/v1/portfolio/evaluations",
            json!({ "portfolio": incomplete }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap().contains("essays"));
}

#[tokio::test]
async fn dimension_handler_rejects_unknown_dimension() {
    let evaluator = Arc::new(evaluator(Arc::new(OfflineReasoningClient)));

    let response = dimension_handler(
        State(evaluator),
        Path("charisma".to_string()),
        axum::Json(EvaluationRequest {
            portfolio: portfolio(),
            mode: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dimension_route_scores_one_dimension() {
    let router = portfolio_router(Arc::new(evaluator(Arc::new(OfflineReasoningClient))));

    let response = router
        .oneshot(post_json(
            "/api/v1/portfolio/dimensions/future-readiness",
            json!({ "portfolio": portfolio(), "mode": "ucla" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(json_body(&payload, "/dimension"), json!("future_readiness"));
    assert_eq!(json_body(&payload, "/path"), json!("heuristic"));
}

#[tokio::test]
async fn entry_route_scores_offline() {
    let router = portfolio_router(Arc::new(evaluator(Arc::new(OfflineReasoningClient))));

    let response = router
        .oneshot(post_json(
            "/api/v1/entries/score",
            json!({
                "text": "Volunteered at the library on weekends helping kids read.",
                "options": { "character_limit": 20 }
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let flags: Vec<&str> = payload["flags"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(flags.contains(&"too_short"));
    assert!(flags.contains(&"over_character_limit"));
    assert_eq!(json_body(&payload, "/path"), json!("heuristic"));
}
