use crate::estimator::domain::DetectionBox;
use serde::Deserialize;

/// Substituted when the detection response omits the source image
/// dimensions. Each coordinate is clamped to [0, 1] independently, so a box
/// reaching past the frame edge becomes a degenerate sliver rather than an
/// error.
pub const DEFAULT_IMAGE_WIDTH: f64 = 1000.0;
pub const DEFAULT_IMAGE_HEIGHT: f64 = 1000.0;

/// One raw vendor prediction: center-based pixel coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Pixel dimensions of the analyzed image, when the vendor reports them.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawImageMeta {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Collapses whitespace runs to underscores; the estimator applies its own
/// deeper canonicalization later.
fn clean_class(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts center-based pixel predictions into top-left fractional boxes.
pub fn normalize_predictions(
    predictions: &[RawPrediction],
    image: Option<&RawImageMeta>,
) -> Vec<DetectionBox> {
    let image_width = image.and_then(|m| m.width).unwrap_or(DEFAULT_IMAGE_WIDTH);
    let image_height = image.and_then(|m| m.height).unwrap_or(DEFAULT_IMAGE_HEIGHT);

    predictions
        .iter()
        .map(|p| DetectionBox {
            x: clamp01((p.x - p.width / 2.0) / image_width),
            y: clamp01((p.y - p.height / 2.0) / image_height),
            w: clamp01(p.width / image_width),
            h: clamp01(p.height / image_height),
            cls: clean_class(&p.class_name),
            score: p.confidence,
        })
        .collect()
}
