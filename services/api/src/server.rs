use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes;
use axum_prometheus::PrometheusMetricLayer;
use fixitbot::chat::ChatClient;
use fixitbot::config::AppConfig;
use fixitbot::detector::DetectionClient;
use fixitbot::error::AppError;
use fixitbot::estimator::EstimateEngine;
use fixitbot::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let detector = Arc::new(DetectionClient::new(config.detector.clone())?);
    let chat = Arc::new(ChatClient::new(config.chat.clone())?);
    if !detector.is_configured() {
        warn!("detector credentials missing; estimates will rely on the fallback heuristic");
    }
    if !chat.is_configured() {
        warn!("chat agent credentials missing; /api/v1/chat will report it");
    }

    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(EstimateEngine::with_defaults()),
        detector,
        chat,
    };

    let app = routes::router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "damage estimate service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
