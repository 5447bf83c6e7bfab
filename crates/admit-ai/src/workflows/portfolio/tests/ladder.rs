use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::common::{dimension_response, ScriptedClient, StalledClient};
use crate::workflows::portfolio::domain::EvaluationPath;
use crate::workflows::portfolio::ladder::{AttemptFailure, LadderPolicy, ReasoningLadder};
use crate::workflows::portfolio::reasoning::{CallParams, ReasoningError, ReasoningRequest};
use crate::workflows::portfolio::schema::parse_dimension;

fn request() -> ReasoningRequest {
    ReasoningRequest {
        system_instructions: "score this".to_string(),
        user_payload: "material".to_string(),
        params: CallParams::default(),
    }
}

fn policy() -> LadderPolicy {
    LadderPolicy {
        call_timeout: Duration::from_secs(5),
    }
}

async fn climb_score(ladder: &ReasoningLadder<'_>) -> (f64, EvaluationPath, Vec<AttemptFailure>) {
    let outcome = ladder
        .climb(
            "dimension",
            &request(),
            |text| parse_dimension(text).map(|payload| payload.score),
            || -1.0,
        )
        .await;
    (outcome.value, outcome.path, outcome.failures)
}

#[tokio::test]
async fn primary_success_makes_one_call() {
    let client = ScriptedClient::new(vec![Ok(dimension_response(7.5, "strong"))]);
    let ladder = ReasoningLadder::new(&client, policy());

    let (score, path, failures) = climb_score(&ladder).await;

    assert_eq!(score, 7.5);
    assert_eq!(path, EvaluationPath::Primary);
    assert!(failures.is_empty());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn malformed_primary_is_retried_with_identical_request() {
    let client = ScriptedClient::new(vec![
        Ok("I think this applicant is pretty good.".to_string()),
        Ok(dimension_response(6.0, "developing")),
    ]);
    let ladder = ReasoningLadder::new(&client, policy());

    let (score, path, failures) = climb_score(&ladder).await;

    assert_eq!(score, 6.0);
    assert_eq!(path, EvaluationPath::Retry);
    assert!(matches!(failures.as_slice(), [AttemptFailure::MalformedResponse(_)]));
    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
}

#[tokio::test]
async fn two_failures_fall_back_after_exactly_two_calls() {
    let client = ScriptedClient::new(vec![
        Err(ReasoningError::Unavailable("connection reset".to_string())),
        Ok("{\"dimension_score\": \"high\"}".to_string()),
        Ok(dimension_response(9.9, "exceptional")),
    ]);
    let ladder = ReasoningLadder::new(&client, policy());

    let (score, path, failures) = climb_score(&ladder).await;

    assert_eq!(score, -1.0);
    assert_eq!(path, EvaluationPath::Heuristic);
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures[0], AttemptFailure::ServiceUnavailable(_)));
    assert!(matches!(failures[1], AttemptFailure::MalformedResponse(_)));
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn slow_service_times_out_on_both_rungs() {
    let client = StalledClient {
        delay: Duration::from_millis(500),
        calls: AtomicUsize::new(0),
    };
    let ladder = ReasoningLadder::new(
        &client,
        LadderPolicy {
            call_timeout: Duration::from_millis(20),
        },
    );

    let (score, path, failures) = climb_score(&ladder).await;

    assert_eq!(score, -1.0);
    assert_eq!(path, EvaluationPath::Heuristic);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    assert!(failures.iter().all(|failure| matches!(
        failure,
        AttemptFailure::ServiceUnavailable(ReasoningError::Timeout(_))
    )));
}

#[tokio::test]
async fn credit_failures_are_reported_on_the_outcome() {
    let client = ScriptedClient::new(vec![
        Err(ReasoningError::InsufficientCredit("credit balance is too low".to_string())),
        Err(ReasoningError::InsufficientCredit("credit balance is too low".to_string())),
    ]);
    let ladder = ReasoningLadder::new(&client, policy());

    let outcome = ladder
        .climb("dimension", &request(), |_| Ok(1.0), || 0.0)
        .await;

    assert_eq!(outcome.path, EvaluationPath::Heuristic);
    assert!(outcome.credit_error());
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn bypassed_ladder_never_calls_the_service() {
    let outcome = ReasoningLadder::heuristic_only("entry", || 3.0);
    assert_eq!(outcome.value, 3.0);
    assert_eq!(outcome.path, EvaluationPath::Heuristic);
    assert!(!outcome.credit_error());
}
