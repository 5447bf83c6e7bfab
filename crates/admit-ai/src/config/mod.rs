use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::portfolio::{CallParams, ConfigurationError, EvaluationMode};

const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub reasoning: ReasoningConfig,
    pub evaluation: EvaluationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            reasoning: ReasoningConfig::from_env()?,
            evaluation: EvaluationSettings::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection and sampling settings for the reasoning service.
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub api_url: String,
    /// Without a key the evaluator runs offline and every ladder uses its heuristic.
    pub api_key: Option<String>,
    pub params: CallParams,
    pub timeout: Duration,
}

impl ReasoningConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = CallParams::default();
        let api_url = env::var("REASONING_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_key = env::var("REASONING_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let model = env::var("REASONING_MODEL").unwrap_or(defaults.model);

        let max_tokens = match env::var("REASONING_MAX_TOKENS") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|tokens| *tokens > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "REASONING_MAX_TOKENS",
                    value,
                })?,
            Err(_) => defaults.max_tokens,
        };
        let temperature = match env::var("REASONING_TEMPERATURE") {
            Ok(value) => value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|temperature| (0.0..=1.0).contains(temperature))
                .ok_or(ConfigError::InvalidNumber {
                    key: "REASONING_TEMPERATURE",
                    value,
                })?,
            Err(_) => defaults.temperature,
        };
        let timeout_secs = match env::var("REASONING_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "REASONING_TIMEOUT_SECS",
                    value,
                })?,
            Err(_) => 45,
        };

        Ok(Self {
            api_url,
            api_key,
            params: CallParams {
                model,
                max_tokens,
                temperature,
            },
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Defaults applied to evaluation requests.
#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub default_mode: EvaluationMode,
    pub narrative_enabled: bool,
}

impl EvaluationSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let default_mode = env::var("EVALUATION_MODE")
            .unwrap_or_else(|_| "general".to_string())
            .parse::<EvaluationMode>()
            .map_err(ConfigError::Evaluation)?;

        let narrative_enabled = match env::var("EVALUATION_NARRATIVE") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag {
                key: "EVALUATION_NARRATIVE",
                value,
            })?,
            Err(_) => true,
        };

        Ok(Self {
            default_mode,
            narrative_enabled,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidFlag { key: &'static str, value: String },
    Evaluation(ConfigurationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} has an invalid value '{value}'")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false, got '{value}'")
            }
            ConfigError::Evaluation(err) => write!(f, "EVALUATION_MODE is invalid: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Evaluation(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "REASONING_API_URL",
            "REASONING_API_KEY",
            "REASONING_MODEL",
            "REASONING_MAX_TOKENS",
            "REASONING_TEMPERATURE",
            "REASONING_TIMEOUT_SECS",
            "EVALUATION_MODE",
            "EVALUATION_NARRATIVE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.reasoning.api_url, DEFAULT_API_URL);
        assert_eq!(config.reasoning.api_key, None);
        assert_eq!(config.reasoning.params.max_tokens, 2000);
        assert_eq!(config.reasoning.timeout, Duration::from_secs(45));
        assert_eq!(config.evaluation.default_mode, EvaluationMode::General);
        assert!(config.evaluation.narrative_enabled);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_reasoning_and_evaluation_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REASONING_API_KEY", "  sk-test  ");
        env::set_var("REASONING_TIMEOUT_SECS", "5");
        env::set_var("EVALUATION_MODE", "UC-Berkeley");
        env::set_var("EVALUATION_NARRATIVE", "off");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.reasoning.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.reasoning.timeout, Duration::from_secs(5));
        assert_eq!(config.evaluation.default_mode, EvaluationMode::UcBerkeley);
        assert!(!config.evaluation.narrative_enabled);
    }

    #[test]
    fn rejects_unknown_mode_and_bad_numbers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EVALUATION_MODE", "harvard");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::Evaluation(ConfigurationError::UnknownMode(_))));

        reset_env();
        env::set_var("REASONING_TEMPERATURE", "hot");
        let err = AppConfig::load().unwrap_err();
        assert!(err.to_string().starts_with("REASONING_TEMPERATURE"));
        reset_env();
    }
}
