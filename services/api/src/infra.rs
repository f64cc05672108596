use fixitbot::chat::ChatClient;
use fixitbot::detector::DetectionClient;
use fixitbot::estimator::EstimateEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<EstimateEngine>,
    pub(crate) detector: Arc<DetectionClient>,
    pub(crate) chat: Arc<ChatClient>,
}
