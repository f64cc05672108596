use crate::infra::AppState;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fixitbot::detector::DetectorError;
use fixitbot::chat::ChatError;
use fixitbot::estimator::domain::{DetectionBox, EstimateResult, UploadHint};
use fixitbot::estimator::diy;
use fixitbot::report::render_report;
use fixitbot::upload::{validate_upload, UploadError, MAX_UPLOAD_BYTES};
use fixitbot::workshops;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

/// Generous enough for a base64 copy of a maximum-size upload.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES * 2 + 2 * 1024 * 1024;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/estimate", post(estimate_endpoint))
        .route("/api/v1/detect", post(detect_endpoint))
        .route("/api/v1/report", post(report_endpoint))
        .route("/api/v1/chat", post(chat_endpoint))
        .route("/api/v1/detector/health", get(detector_health_endpoint))
        .route("/api/v1/guides", get(guides_endpoint))
        .route("/api/v1/workshops", get(workshops_endpoint))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn join_notes(first: Option<String>, second: Option<String>) -> Option<String> {
    let parts: Vec<String> = [first, second].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn content_type_of(request: &Request) -> String {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct EstimateJsonRequest {
    #[serde(default)]
    boxes: Option<Vec<DetectionBox>>,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// One endpoint, three entry paths: recompute from boxes (JSON), detect
/// from a base64 payload (JSON or form), or detect from an uploaded file.
pub(crate) async fn estimate_endpoint(
    State(state): State<AppState>,
    request: Request,
) -> Response {
    let content_type = content_type_of(&request);

    if content_type.contains("application/json") {
        let bytes = match axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "No se pudo leer el cuerpo de la petición.",
                )
            }
        };
        let payload: EstimateJsonRequest = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(err) => {
                return error_response(StatusCode::BAD_REQUEST, &format!("JSON inválido: {err}"))
            }
        };
        return estimate_from_json(state, payload).await;
    }

    if content_type.contains("multipart/form-data") {
        let multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "No se pudo leer el formulario multipart.",
                )
            }
        };
        return estimate_from_multipart(state, multipart).await;
    }

    error_response(
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "Content-Type no soportado. Usa application/json o multipart/form-data.",
    )
}

async fn estimate_from_json(state: AppState, payload: EstimateJsonRequest) -> Response {
    if let Some(boxes) = payload.boxes.filter(|boxes| !boxes.is_empty()) {
        let mut result = state.engine.estimate(&boxes, None);
        result.note = join_notes(result.note.take(), payload.note);
        return (StatusCode::OK, Json(result)).into_response();
    }

    if let Some(image_base64) = payload.image_base64.filter(|value| !value.is_empty()) {
        let outcome = state.detector.detect_base64_lenient(&image_base64).await;
        let mut result = state.engine.estimate(&outcome.boxes, None);
        result.note = join_notes(result.note.take(), outcome.note);
        return (StatusCode::OK, Json(result)).into_response();
    }

    error_response(
        StatusCode::BAD_REQUEST,
        "Faltan 'boxes' o 'image_base64' en JSON.",
    )
}

struct UploadedFile {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: String,
}

enum MultipartImage {
    File(UploadedFile),
    Base64(String),
    Missing,
}

async fn collect_multipart_image(mut multipart: Multipart) -> Result<MultipartImage, Response> {
    let mut file: Option<UploadedFile> = None;
    let mut base64_field: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "No se pudo leer el formulario multipart.",
                ))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "image" if file.is_none() => {
                let content_type = field.content_type().map(|value| value.to_string());
                let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some(UploadedFile {
                            bytes: bytes.to_vec(),
                            content_type,
                            file_name,
                        })
                    }
                    Err(_) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            "No se pudo leer el archivo subido.",
                        ))
                    }
                }
            }
            "image_base64" if base64_field.is_none() => {
                if let Ok(text) = field.text().await {
                    if !text.is_empty() {
                        base64_field = Some(text);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(file) = file {
        return Ok(MultipartImage::File(file));
    }
    if let Some(base64) = base64_field {
        return Ok(MultipartImage::Base64(base64));
    }
    Ok(MultipartImage::Missing)
}

async fn estimate_from_multipart(state: AppState, multipart: Multipart) -> Response {
    let image = match collect_multipart_image(multipart).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    match image {
        MultipartImage::File(file) => {
            if let Err(err) = validate_upload(file.content_type.as_deref(), file.bytes.len()) {
                let status = match err {
                    UploadError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                };
                return error_response(status, &err.to_string());
            }

            let hint = UploadHint {
                byte_size: file.bytes.len() as u64,
            };
            let outcome = state
                .detector
                .detect_file_lenient(file.bytes, &file.file_name)
                .await;
            let mut result = state.engine.estimate(&outcome.boxes, Some(hint));
            result.note = join_notes(result.note.take(), outcome.note);
            (StatusCode::OK, Json(result)).into_response()
        }
        MultipartImage::Base64(image_base64) => {
            let outcome = state.detector.detect_base64_lenient(&image_base64).await;
            let mut result = state.engine.estimate(&outcome.boxes, None);
            result.note = join_notes(result.note.take(), outcome.note);
            (StatusCode::OK, Json(result)).into_response()
        }
        MultipartImage::Missing => error_response(
            StatusCode::BAD_REQUEST,
            "No se subió ningún 'file'/'image' ni 'image_base64'.",
        ),
    }
}

#[derive(Debug, Deserialize)]
struct DetectJsonRequest {
    #[serde(default)]
    image_base64: Option<String>,
}

/// Thin detection proxy: forwards the image and returns normalized boxes.
pub(crate) async fn detect_endpoint(State(state): State<AppState>, request: Request) -> Response {
    let content_type = content_type_of(&request);

    let detection = if content_type.contains("multipart/form-data") {
        let multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "No se pudo leer el formulario multipart.",
                )
            }
        };
        match collect_multipart_image(multipart).await {
            Ok(MultipartImage::File(file)) => {
                state.detector.detect_file(file.bytes, &file.file_name).await
            }
            Ok(MultipartImage::Base64(image_base64)) => {
                state.detector.detect_base64(&image_base64).await
            }
            Ok(MultipartImage::Missing) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "No se encontró 'file' ni 'image_base64' en multipart.",
                )
            }
            Err(response) => return response,
        }
    } else if content_type.contains("application/json") {
        let bytes = match axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "No se pudo leer el cuerpo de la petición.",
                )
            }
        };
        let payload: DetectJsonRequest = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(err) => {
                return error_response(StatusCode::BAD_REQUEST, &format!("JSON inválido: {err}"))
            }
        };
        match payload.image_base64.filter(|value| !value.is_empty()) {
            Some(image_base64) => state.detector.detect_base64(&image_base64).await,
            None => return error_response(StatusCode::BAD_REQUEST, "Falta image_base64 en JSON."),
        }
    } else {
        return error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type no soportado. Usa multipart/form-data (file) o application/json (image_base64).",
        );
    };

    match detection {
        Ok(boxes) => (StatusCode::OK, Json(json!({ "boxes": boxes }))).into_response(),
        Err(DetectorError::Unconfigured) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Faltan variables de entorno del detector.",
        ),
        Err(DetectorError::UpstreamStatus { status, detail }) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": format!("Detector {status}"), "detail": detail })),
        )
            .into_response(),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct ReportRequest {
    result: EstimateResult,
    #[serde(default)]
    image: Option<String>,
}

pub(crate) async fn report_endpoint(Json(payload): Json<ReportRequest>) -> Response {
    match render_report(&payload.result, payload.image.as_deref()) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"FixItBot-Reporte-Analisis.pdf\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "report rendering failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "No se pudo generar el reporte PDF.",
            )
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    text: String,
}

pub(crate) async fn chat_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    if payload.session_id.trim().is_empty() || payload.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "sessionId y text son requeridos.");
    }

    match state.chat.send(&payload.session_id, &payload.text).await {
        Ok(replies) => (StatusCode::OK, Json(json!({ "replies": replies }))).into_response(),
        Err(ChatError::Unconfigured) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Faltan variables de entorno del agente de chat.",
        ),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, &err.to_string()),
    }
}

pub(crate) async fn detector_health_endpoint(State(state): State<AppState>) -> Response {
    match state.detector.health().await {
        Ok(health) => (StatusCode::OK, Json(health)).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

pub(crate) async fn guides_endpoint(Query(query): Query<SearchQuery>) -> Response {
    let guides = diy::search_catalog(query.q.as_deref().unwrap_or(""));
    (StatusCode::OK, Json(json!({ "guides": guides }))).into_response()
}

pub(crate) async fn workshops_endpoint(Query(query): Query<SearchQuery>) -> Response {
    let workshops = workshops::search(query.q.as_deref().unwrap_or(""));
    (StatusCode::OK, Json(json!({ "workshops": workshops }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use fixitbot::chat::ChatClient;
    use fixitbot::config::{ChatConfig, DetectorConfig};
    use fixitbot::detector::DetectionClient;
    use fixitbot::estimator::EstimateEngine;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(ready: bool) -> AppState {
        let detector = DetectionClient::new(DetectorConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            model: None,
            version: "1".to_string(),
            api_key: None,
            confidence: "0.25".to_string(),
            overlap: "0.45".to_string(),
        })
        .expect("detector client builds");
        let chat = ChatClient::new(ChatConfig {
            agent_url: None,
            access_token: None,
            language: "es".to_string(),
        })
        .expect("chat client builds");

        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            engine: Arc::new(EstimateEngine::with_defaults()),
            detector: Arc::new(detector),
            chat: Arc::new(chat),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn estimate_recomputes_from_boxes_json() {
        let app = router(test_state(true));
        let payload = serde_json::json!({
            "boxes": [{ "x": 0.1, "y": 0.1, "w": 0.3, "h": 0.3, "cls": "dent", "score": 0.8 }]
        });
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/v1/estimate")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["severity"], "avanzado");
        assert_eq!(body["category"], "dent");
        assert_eq!(body["estimate"], 1634);
        assert_eq!(body["breakdown"]["zone"], "default");
        assert_eq!(body["insights"]["recommendWorkshop"], true);
    }

    #[tokio::test]
    async fn estimate_appends_the_caller_note() {
        let app = router(test_state(true));
        let payload = serde_json::json!({
            "boxes": [{ "x": 0.1, "y": 0.1, "w": 0.3, "h": 0.3, "cls": "scratch", "score": 0.9 }],
            "note": "recalculado"
        });
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/v1/estimate")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["note"], "recalculado");
    }

    #[tokio::test]
    async fn estimate_rejects_empty_json_payloads() {
        let app = router(test_state(true));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/v1/estimate")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn estimate_rejects_unsupported_content_types() {
        let app = router(test_state(true));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/v1/estimate")
                    .header("content-type", "text/plain")
                    .body(Body::from("hola"))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn chat_requires_session_and_text() {
        let app = router(test_state(true));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/api/v1/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId":"","text":""}"#))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn guides_filter_by_query() {
        let app = router(test_state(true));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/v1/guides?q=PDR")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let guides = body["guides"].as_array().expect("guides array");
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0]["id"], "abolladura-pequena");
    }

    #[tokio::test]
    async fn workshops_return_the_directory() {
        let app = router(test_state(true));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/v1/workshops")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["workshops"].as_array().expect("array").len(), 3);
    }

    #[tokio::test]
    async fn readiness_reports_service_unavailable_until_bound() {
        let app = router(test_state(false));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
