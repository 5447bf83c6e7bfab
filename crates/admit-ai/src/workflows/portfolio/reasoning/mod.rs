//! Boundary to the external reasoning service.
//!
//! The core only relies on the contract of [`ReasoningClient`]: a call may fail, may
//! return arbitrary text, and has no latency guarantee. Callers inject an implementation
//! so tests can substitute a scripted double.

mod http;

pub use http::HttpReasoningClient;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded with every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CallParams {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 2000,
            temperature: 0.3,
        }
    }
}

impl CallParams {
    pub fn with_max_tokens(&self, max_tokens: u32) -> Self {
        Self {
            max_tokens,
            ..self.clone()
        }
    }
}

/// One request to the reasoning service. Retries resend the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub system_instructions: String,
    pub user_payload: String,
    pub params: CallParams,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReasoningError {
    #[error("reasoning service unavailable: {0}")]
    Unavailable(String),
    #[error("reasoning service timed out after {0:?}")]
    Timeout(Duration),
    #[error("reasoning service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("reasoning service rejected the call for insufficient credit: {0}")]
    InsufficientCredit(String),
    #[error("reasoning service envelope could not be read: {0}")]
    InvalidEnvelope(String),
    #[error("reasoning service is not configured")]
    NotConfigured,
}

impl ReasoningError {
    pub fn is_credit_error(&self) -> bool {
        matches!(self, ReasoningError::InsufficientCredit(_))
    }
}

#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Return the service's raw text answer for `request`.
    async fn explain(&self, request: &ReasoningRequest) -> Result<String, ReasoningError>;
}

/// Client used when no service credentials are configured. Every ladder that
/// uses it resolves on its heuristic rung.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineReasoningClient;

#[async_trait]
impl ReasoningClient for OfflineReasoningClient {
    async fn explain(&self, _request: &ReasoningRequest) -> Result<String, ReasoningError> {
        Err(ReasoningError::NotConfigured)
    }
}
