//! The three-rung failure ladder shared by every analyzer:
//! primary call, one identical retry, then a deterministic heuristic.

use std::time::Duration;

use tracing::{info, warn};

use super::domain::EvaluationPath;
use super::parser::ParseError;
use super::reasoning::{ReasoningClient, ReasoningError, ReasoningRequest};

/// Service rungs attempted before the heuristic. Never more than two calls.
const SERVICE_RUNGS: [EvaluationPath; 2] = [EvaluationPath::Primary, EvaluationPath::Retry];

/// Why a service rung did not produce a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    ServiceUnavailable(ReasoningError),
    #[error(transparent)]
    MalformedResponse(ParseError),
}

impl AttemptFailure {
    pub fn is_credit_error(&self) -> bool {
        matches!(self, AttemptFailure::ServiceUnavailable(err) if err.is_credit_error())
    }

    fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::ServiceUnavailable(_) => "service_unavailable",
            AttemptFailure::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A value plus the rung that produced it and the failures on the way down.
#[derive(Debug, Clone)]
pub struct LadderOutcome<T> {
    pub value: T,
    pub path: EvaluationPath,
    pub failures: Vec<AttemptFailure>,
}

impl<T> LadderOutcome<T> {
    pub fn credit_error(&self) -> bool {
        self.failures.iter().any(AttemptFailure::is_credit_error)
    }
}

/// Per-call bound applied to every service rung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderPolicy {
    pub call_timeout: Duration,
}

impl Default for LadderPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(45),
        }
    }
}

pub struct ReasoningLadder<'a> {
    client: &'a dyn ReasoningClient,
    policy: LadderPolicy,
}

impl<'a> ReasoningLadder<'a> {
    pub fn new(client: &'a dyn ReasoningClient, policy: LadderPolicy) -> Self {
        Self { client, policy }
    }

    /// Walk the ladder. `parse` validates service text; `fallback` must be total.
    pub async fn climb<T, P, F>(
        &self,
        stage: &str,
        request: &ReasoningRequest,
        parse: P,
        fallback: F,
    ) -> LadderOutcome<T>
    where
        P: Fn(&str) -> Result<T, ParseError>,
        F: FnOnce() -> T,
    {
        let mut failures = Vec::with_capacity(SERVICE_RUNGS.len());

        for rung in SERVICE_RUNGS {
            match self.attempt(request, &parse).await {
                Ok(value) => {
                    info!(stage, path = rung.label(), "reasoning ladder resolved");
                    return LadderOutcome {
                        value,
                        path: rung,
                        failures,
                    };
                }
                Err(failure) => {
                    warn!(
                        stage,
                        path = rung.label(),
                        failure = failure.kind(),
                        error = %failure,
                        "reasoning rung failed"
                    );
                    failures.push(failure);
                }
            }
        }

        let value = fallback();
        info!(
            stage,
            path = EvaluationPath::Heuristic.label(),
            failed_rungs = failures.len(),
            "reasoning ladder resolved"
        );
        LadderOutcome {
            value,
            path: EvaluationPath::Heuristic,
            failures,
        }
    }

    /// Skip the service entirely; used when a caller opts out of reasoning.
    pub fn heuristic_only<T, F>(stage: &str, fallback: F) -> LadderOutcome<T>
    where
        F: FnOnce() -> T,
    {
        info!(
            stage,
            path = EvaluationPath::Heuristic.label(),
            "reasoning ladder bypassed"
        );
        LadderOutcome {
            value: fallback(),
            path: EvaluationPath::Heuristic,
            failures: Vec::new(),
        }
    }

    async fn attempt<T, P>(
        &self,
        request: &ReasoningRequest,
        parse: &P,
    ) -> Result<T, AttemptFailure>
    where
        P: Fn(&str) -> Result<T, ParseError>,
    {
        let limit = self.policy.call_timeout;
        let text = tokio::time::timeout(limit, self.client.explain(request))
            .await
            .map_err(|_| AttemptFailure::ServiceUnavailable(ReasoningError::Timeout(limit)))?
            .map_err(AttemptFailure::ServiceUnavailable)?;

        parse(&text).map_err(AttemptFailure::MalformedResponse)
    }
}
