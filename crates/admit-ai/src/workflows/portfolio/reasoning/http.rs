use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ReasoningClient, ReasoningError, ReasoningRequest};

const MESSAGES_PATH: &str = "/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Messages-style HTTP adapter for the reasoning service.
#[derive(Debug, Clone)]
pub struct HttpReasoningClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl HttpReasoningClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ReasoningError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| ReasoningError::Unavailable(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            request_timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, MESSAGES_PATH)
    }

    fn map_transport(&self, err: reqwest::Error) -> ReasoningError {
        if err.is_timeout() {
            ReasoningError::Timeout(self.request_timeout)
        } else {
            ReasoningError::Unavailable(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn looks_like_credit_error(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("credit balance") || lowered.contains("insufficient credit")
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn explain(&self, request: &ReasoningRequest) -> Result<String, ReasoningError> {
        let body = json!({
            "model": request.params.model,
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
            "system": request.system_instructions,
            "messages": [
                { "role": "user", "content": request.user_payload }
            ],
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.map_transport(err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 402 || looks_like_credit_error(&text) {
                return Err(ReasoningError::InsufficientCredit(text));
            }
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: MessagesEnvelope = response
            .json()
            .await
            .map_err(|err| ReasoningError::InvalidEnvelope(err.to_string()))?;

        let text = envelope
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(ReasoningError::InvalidEnvelope(
                "response contained no text blocks".to_string(),
            ));
        }

        Ok(text)
    }
}
