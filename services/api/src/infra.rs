use admit_ai::config::AppConfig;
use admit_ai::error::AppError;
use admit_ai::workflows::portfolio::{
    EvaluationError, HttpReasoningClient, LadderPolicy, OfflineReasoningClient, Portfolio,
    PortfolioEvaluator, ReasoningClient,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the evaluator from configuration. Without an API key every ladder resolves heuristically.
pub(crate) fn build_evaluator(config: &AppConfig) -> Result<PortfolioEvaluator, AppError> {
    let client: Arc<dyn ReasoningClient> = match &config.reasoning.api_key {
        Some(api_key) => Arc::new(HttpReasoningClient::new(
            config.reasoning.api_url.clone(),
            api_key.clone(),
            config.reasoning.timeout,
        )?),
        None => {
            warn!("REASONING_API_KEY is not set; evaluations will use heuristic scoring only");
            Arc::new(OfflineReasoningClient)
        }
    };

    let evaluator = PortfolioEvaluator::new(client)
        .map_err(EvaluationError::from)?
        .with_params(config.reasoning.params.clone())
        .with_policy(LadderPolicy {
            call_timeout: config.reasoning.timeout,
        })
        .with_narrative(config.evaluation.narrative_enabled)
        .with_default_mode(config.evaluation.default_mode);

    Ok(evaluator)
}

pub(crate) fn offline_evaluator() -> Result<PortfolioEvaluator, AppError> {
    PortfolioEvaluator::new(Arc::new(OfflineReasoningClient))
        .map_err(|err| AppError::from(EvaluationError::from(err)))
}

pub(crate) fn load_portfolio(path: &Path) -> Result<Portfolio, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_ai::config::{
        AppEnvironment, EvaluationSettings, ReasoningConfig, ServerConfig, TelemetryConfig,
    };
    use admit_ai::workflows::portfolio::{CallParams, EvaluationMode};
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            reasoning: ReasoningConfig {
                api_url: "http://127.0.0.1:9".to_string(),
                api_key: api_key.map(str::to_string),
                params: CallParams::default(),
                timeout: Duration::from_secs(1),
            },
            evaluation: EvaluationSettings {
                default_mode: EvaluationMode::Ucla,
                narrative_enabled: false,
            },
        }
    }

    #[test]
    fn evaluator_carries_configured_default_mode() {
        let evaluator = build_evaluator(&config(None)).expect("offline evaluator builds");
        assert_eq!(evaluator.default_mode(), EvaluationMode::Ucla);

        let evaluator = build_evaluator(&config(Some("sk-test"))).expect("http evaluator builds");
        assert_eq!(evaluator.default_mode(), EvaluationMode::Ucla);
    }

    #[test]
    fn missing_portfolio_file_is_an_io_error() {
        let err = load_portfolio(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
