use super::classes::{dominant_category, normalize_class};
use super::diy::pick_diy;
use super::domain::{
    CostBreakdown, DetectionBox, EstimateInsights, EstimateResult, PartCost, Severity, UploadHint,
    ZoneKey,
};
use super::filter::post_filter;
use super::insights::{recommend_workshop, top_classes};
use super::pricing::{
    area_factor, base_cost, replacement_cost, REPLACEMENT_CATEGORY, REPLACEMENT_NOTE,
};
use super::severity::{fallback_from_upload, infer_severity, FALLBACK_AREA_LABEL};
use super::zones::{area_labels, zone_key, UNIDENTIFIED_ZONE};
use serde::{Deserialize, Serialize};

/// Tuning thresholds for the estimation pipeline, surfaced here so the
/// defaults are visible instead of buried in arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Minimum detector confidence; boxes below it are treated as noise.
    pub min_score: f64,
    /// Minimum box area as a fraction of the frame.
    pub min_box_area: f64,
    /// Damaged-area fraction above which severe damage prices a replacement.
    pub replacement_area_threshold: f64,
    /// Largest damaged-area fraction an intermedio result may cover and
    /// still qualify for a DIY guide.
    pub diy_intermedio_area_allowance: f64,
    /// Damaged-area fraction beyond which a workshop visit is recommended.
    pub workshop_area_threshold: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_score: 0.60,
            min_box_area: 0.015,
            replacement_area_threshold: 0.10,
            diy_intermedio_area_allowance: 0.03,
            workshop_area_threshold: 0.08,
        }
    }
}

/// Stateless engine applying the pricing heuristic to detector output.
/// Pure and synchronous: the same boxes always produce the same result.
pub struct EstimateEngine {
    config: EstimatorConfig,
}

impl EstimateEngine {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EstimatorConfig::default())
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Computes the full estimate. `upload` carries byte-level facts about
    /// the original photo and only feeds the last-resort fallback when no
    /// box survives the post-filter.
    pub fn estimate(&self, input: &[DetectionBox], upload: Option<UploadHint>) -> EstimateResult {
        let boxes = post_filter(input, self.config.min_score, self.config.min_box_area);
        let area_pct = boxes.iter().map(DetectionBox::area).sum::<f64>().min(1.0);
        let has_detections = !boxes.is_empty();

        let (severity, category) = if !has_detections {
            match upload {
                Some(hint) => {
                    let (sev, cat) = fallback_from_upload(hint);
                    (sev, cat.to_string())
                }
                None => (Severity::Bajo, "scratch".to_string()),
            }
        } else {
            (infer_severity(&boxes), dominant_category(&boxes))
        };

        let mut sev_factor = severity.factor();
        let area_k = area_factor(area_pct);

        let mut total_base: u32 = 0;
        let mut detailed: Vec<PartCost> = Vec::new();
        let mut zones: Vec<ZoneKey> = Vec::new();
        let area_description: String;

        if has_detections {
            let labels = area_labels(&boxes);
            area_description = labels.join(" y ");
            for label in &labels {
                let zone = zone_key(label);
                let base = base_cost(&normalize_class(&category), zone);
                total_base += base;
                detailed.push(PartCost {
                    part: label.clone(),
                    base,
                    zone: zone.key().to_string(),
                });
                if !zones.contains(&zone) {
                    zones.push(zone);
                }
            }
        } else {
            area_description = match upload {
                Some(_) => FALLBACK_AREA_LABEL.to_string(),
                None => UNIDENTIFIED_ZONE.to_string(),
            };
            let zone = zone_key(&area_description);
            let base = base_cost(&normalize_class(&category), zone);
            total_base = base;
            detailed.push(PartCost {
                part: area_description.clone(),
                base,
                zone: zone.key().to_string(),
            });
            zones.push(zone);
        }

        let mut category = category;
        let mut note: Option<String> = None;

        if severity == Severity::Avanzado && area_pct > self.config.replacement_area_threshold {
            let main_zone = zones.first().copied().unwrap_or(ZoneKey::Default);
            total_base = replacement_cost(main_zone);
            if let Some(first) = detailed.first_mut() {
                first.base = total_base;
            }
            category = REPLACEMENT_CATEGORY.to_string();
            note = Some(REPLACEMENT_NOTE.to_string());
            sev_factor = 1.0;
        }

        let estimate = (f64::from(total_base) * sev_factor * area_k).round() as u32;
        let diy = pick_diy(
            &category,
            severity,
            area_pct,
            self.config.diy_intermedio_area_allowance,
        );

        let breakdown_zone = if zones.len() > 1 {
            "multiple".to_string()
        } else {
            zones
                .first()
                .copied()
                .unwrap_or(ZoneKey::Default)
                .key()
                .to_string()
        };

        let insights = EstimateInsights {
            top_classes: top_classes(&boxes).into_iter().take(3).collect(),
            recommend_workshop: recommend_workshop(
                severity,
                area_pct,
                &boxes,
                self.config.workshop_area_threshold,
            ),
        };

        EstimateResult {
            severity,
            area: area_description,
            category,
            estimate,
            diy,
            boxes,
            area_pct,
            note,
            breakdown: CostBreakdown {
                base: total_base,
                sev_factor,
                area_factor: area_k,
                area_pct,
                zone: breakdown_zone,
            },
            detailed_breakdown: detailed,
            insights,
        }
    }
}
