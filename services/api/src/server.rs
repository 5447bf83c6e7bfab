use crate::cli::ServeArgs;
use crate::infra::{build_evaluator, AppState};
use crate::routes::with_portfolio_routes;
use admit_ai::config::AppConfig;
use admit_ai::error::AppError;
use admit_ai::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let evaluator = Arc::new(build_evaluator(&config)?);
    let default_mode = evaluator.default_mode();
    let offline = config.reasoning.api_key.is_none();

    let app = with_portfolio_routes(evaluator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        mode = default_mode.key(),
        offline,
        "portfolio evaluator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
