mod normalizer;

pub use normalizer::{
    normalize_predictions, RawImageMeta, RawPrediction, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
};

use crate::config::DetectorConfig;
use crate::estimator::domain::DetectionBox;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const UPSTREAM_DETAIL_LIMIT: usize = 500;

/// Detector output plus an operator-facing note when the vendor call
/// degraded instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    #[serde(default)]
    pub boxes: Vec<DetectionBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Sanitized vendor health probe; never echoes the key itself.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorHealth {
    pub ok: bool,
    pub model: String,
    pub version: String,
    pub key_len: usize,
    pub key_prefix: String,
    pub key_suffix: String,
    pub looks_publishable: bool,
    pub ping_status: u16,
    pub ping_preview: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("detector is not configured: set DETECTOR_MODEL and DETECTOR_API_KEY")]
    Unconfigured,
    #[error("failed to reach the detection service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("detection service returned {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },
    #[error("detection service returned an unreadable payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Deserialize)]
struct DetectApiResponse {
    #[serde(default)]
    predictions: Vec<RawPrediction>,
    #[serde(default)]
    image: Option<RawImageMeta>,
}

/// Client for the hosted object-detection endpoint.
pub struct DetectionClient {
    http: reqwest::Client,
    config: DetectorConfig,
}

impl DetectionClient {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn detect_request(&self) -> Result<reqwest::RequestBuilder, DetectorError> {
        let model = self
            .config
            .model
            .as_deref()
            .ok_or(DetectorError::Unconfigured)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(DetectorError::Unconfigured)?;

        let url = format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            self.config.version
        );

        Ok(self.http.post(url).query(&[
            ("api_key", api_key),
            ("confidence", self.config.confidence.as_str()),
            ("overlap", self.config.overlap.as_str()),
            ("format", "json"),
        ]))
    }

    /// Detects damage in raw image bytes via a multipart upload.
    pub async fn detect_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self.detect_request()?.multipart(form).send().await?;
        self.parse_response(response).await
    }

    /// Detects damage in a base64 payload; data-URI prefixes are stripped.
    pub async fn detect_base64(
        &self,
        image_base64: &str,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        let payload = strip_data_uri_prefix(image_base64);
        let response = self
            .detect_request()?
            .form(&[("image", payload)])
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn parse_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<DetectionBox>, DetectorError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DetectorError::UpstreamStatus {
                status: status.as_u16(),
                detail: detail.chars().take(UPSTREAM_DETAIL_LIMIT).collect(),
            });
        }

        let parsed: DetectApiResponse = response
            .json()
            .await
            .map_err(|err| DetectorError::InvalidPayload(err.to_string()))?;
        Ok(normalize_predictions(
            &parsed.predictions,
            parsed.image.as_ref(),
        ))
    }

    /// Detection that never fails the request path: any error becomes an
    /// empty box list plus a note for the caller to surface.
    pub async fn detect_file_lenient(&self, bytes: Vec<u8>, file_name: &str) -> DetectionOutcome {
        match self.detect_file(bytes, file_name).await {
            Ok(boxes) => DetectionOutcome { boxes, note: None },
            Err(err) => degraded_outcome(err),
        }
    }

    pub async fn detect_base64_lenient(&self, image_base64: &str) -> DetectionOutcome {
        match self.detect_base64(image_base64).await {
            Ok(boxes) => DetectionOutcome { boxes, note: None },
            Err(err) => degraded_outcome(err),
        }
    }

    /// Pings the vendor API root and reports sanitized key hints.
    pub async fn health(&self) -> Result<DetectorHealth, DetectorError> {
        let key = self.config.api_key.clone().unwrap_or_default();
        let url = format!("{}/", self.config.api_base.trim_end_matches('/'));
        let response = self
            .http
            .get(url)
            .query(&[("api_key", key.as_str())])
            .send()
            .await?;

        let ping_status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let chars: Vec<char> = key.chars().collect();
        let key_suffix = if chars.len() >= 4 {
            chars[chars.len() - 4..].iter().collect()
        } else {
            String::new()
        };

        Ok(DetectorHealth {
            ok: ping_status == 200,
            model: self.config.model.clone().unwrap_or_default(),
            version: self.config.version.clone(),
            key_len: chars.len(),
            key_prefix: chars.iter().take(4).collect(),
            key_suffix,
            looks_publishable: key.starts_with("rf_"),
            ping_status,
            ping_preview: body.chars().take(80).collect(),
        })
    }
}

fn degraded_outcome(err: DetectorError) -> DetectionOutcome {
    warn!(error = %err, "detector call degraded to empty result");
    DetectionOutcome {
        boxes: Vec::new(),
        note: Some(format!("Error al llamar al detector: {err}")),
    }
}

fn strip_data_uri_prefix(value: &str) -> String {
    match value.find("base64,") {
        Some(index) => value[index + "base64,".len()..].to_string(),
        None => value.to_string(),
    }
}
