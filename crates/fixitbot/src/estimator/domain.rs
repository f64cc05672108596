use serde::{Deserialize, Serialize};

/// One detected damage region in fractional image coordinates, top-left
/// origin. Coordinates are clamped per field at the detector boundary, so a
/// box at the image edge may already be degenerate (zero area).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub cls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl DetectionBox {
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn centroid(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Damage-extent tier driving the pricing multipliers. Ordered: a larger
/// tier never prices below a smaller one for the same base cost.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Bajo,
    Intermedio,
    Avanzado,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bajo => "bajo",
            Self::Intermedio => "intermedio",
            Self::Avanzado => "avanzado",
        }
    }

    pub const fn factor(self) -> f64 {
        match self {
            Self::Bajo => 1.0,
            Self::Intermedio => 1.3,
            Self::Avanzado => 1.6,
        }
    }
}

/// Canonical vehicle-panel location used purely as a pricing-table key,
/// distinct from the human-readable area description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKey {
    Bumper,
    DoorPanel,
    Hood,
    Roof,
    SidePanel,
    Lamp,
    Tire,
    Glass,
    Mirror,
    Default,
}

impl ZoneKey {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bumper => "bumper",
            Self::DoorPanel => "door_panel",
            Self::Hood => "hood",
            Self::Roof => "roof",
            Self::SidePanel => "side_panel",
            Self::Lamp => "lamp",
            Self::Tire => "tire",
            Self::Glass => "glass",
            Self::Mirror => "mirror",
            Self::Default => "default",
        }
    }
}

/// Byte-level facts about the uploaded photo; consumed only by the
/// last-resort fallback heuristic when the detector yields nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadHint {
    pub byte_size: u64,
}

/// A hand-authored do-it-yourself repair guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiyGuide {
    pub title: String,
    pub video_url: String,
    pub steps: Vec<String>,
}

/// How the final price was assembled, for display alongside the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub base: u32,
    pub sev_factor: f64,
    pub area_factor: f64,
    pub area_pct: f64,
    pub zone: String,
}

/// One priced line of the per-part breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartCost {
    pub part: String,
    pub base: u32,
    pub zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClassEntry {
    pub cls: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInsights {
    pub top_classes: Vec<TopClassEntry>,
    pub recommend_workshop: bool,
}

/// The full estimation output. Field names serialize camelCase to preserve
/// the wire shape consumed by the presentation and report layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub severity: Severity,
    pub area: String,
    pub category: String,
    pub estimate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diy: Option<DiyGuide>,
    pub boxes: Vec<DetectionBox>,
    pub area_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub breakdown: CostBreakdown,
    pub detailed_breakdown: Vec<PartCost>,
    pub insights: EstimateInsights,
}
