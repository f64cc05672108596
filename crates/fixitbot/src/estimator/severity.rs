use super::classes::is_hard_class;
use super::domain::{DetectionBox, Severity, UploadHint};

/// Confidence assumed when the detector omits a score.
const DEFAULT_CONFIDENCE: f64 = 0.5;
/// Weighted-area floor below which a hard class alone does not escalate.
const HARD_CLASS_AREA_FLOOR: f64 = 0.03;
const LOW_SEVERITY_CEILING: f64 = 0.02;
const MID_SEVERITY_CEILING: f64 = 0.06;

pub(crate) const FALLBACK_AREA_LABEL: &str = "componente exterior (estimado)";

const FALLBACK_LOW_CEILING_BYTES: u64 = 800_000;
const FALLBACK_MID_CEILING_BYTES: u64 = 1_600_000;

/// Confidence-weighted damaged-area score across all boxes.
pub(crate) fn weighted_damage_score(boxes: &[DetectionBox]) -> f64 {
    boxes
        .iter()
        .map(|b| {
            let conf = b.score.map_or(DEFAULT_CONFIDENCE, |s| s.clamp(0.0, 1.0));
            (0.5 + 0.5 * conf) * b.area()
        })
        .sum()
}

/// Severity tier from the surviving boxes. The hard-class check runs on the
/// raw, non-normalized class string.
pub(crate) fn infer_severity(boxes: &[DetectionBox]) -> Severity {
    let score = weighted_damage_score(boxes);
    let has_hard = boxes.iter().any(|b| is_hard_class(&b.cls));

    if has_hard && score > HARD_CLASS_AREA_FLOOR {
        return Severity::Avanzado;
    }
    if score < LOW_SEVERITY_CEILING {
        Severity::Bajo
    } else if score < MID_SEVERITY_CEILING {
        Severity::Intermedio
    } else {
        Severity::Avanzado
    }
}

/// Last-resort guess from the upload size alone. File size is not a damage
/// signal; this only exists so the request still returns a plausible result
/// instead of an error when the detector yields nothing usable.
pub(crate) fn fallback_from_upload(hint: UploadHint) -> (Severity, &'static str) {
    if hint.byte_size < FALLBACK_LOW_CEILING_BYTES {
        (Severity::Bajo, "scratch")
    } else if hint.byte_size < FALLBACK_MID_CEILING_BYTES {
        (Severity::Intermedio, "paint_damage")
    } else {
        (Severity::Avanzado, "dent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(cls: &str, w: f64, h: f64, score: Option<f64>) -> DetectionBox {
        DetectionBox {
            x: 0.1,
            y: 0.1,
            w,
            h,
            cls: cls.to_string(),
            score,
        }
    }

    #[test]
    fn empty_input_is_low_severity() {
        assert_eq!(infer_severity(&[]), Severity::Bajo);
    }

    #[test]
    fn missing_score_defaults_confidence() {
        // 0.75 * 0.01 = 0.0075 < 0.02
        let boxes = vec![boxed("dent", 0.1, 0.1, None)];
        assert!((weighted_damage_score(&boxes) - 0.0075).abs() < 1e-12);
        assert_eq!(infer_severity(&boxes), Severity::Bajo);
    }

    #[test]
    fn mid_band_is_intermedio() {
        // 0.9 * 0.04 = 0.036
        let boxes = vec![boxed("dent", 0.2, 0.2, Some(0.8))];
        assert_eq!(infer_severity(&boxes), Severity::Intermedio);
    }

    #[test]
    fn large_weighted_area_is_avanzado_without_hard_class() {
        // 0.9 * 0.09 = 0.081 >= 0.06
        let boxes = vec![boxed("dent", 0.3, 0.3, Some(0.8))];
        assert_eq!(infer_severity(&boxes), Severity::Avanzado);
    }

    #[test]
    fn hard_class_escalates_above_the_area_floor() {
        // 0.9 * 0.04 = 0.036 > 0.03 and "crack" is hard
        let boxes = vec![boxed("crack", 0.2, 0.2, Some(0.8))];
        assert_eq!(infer_severity(&boxes), Severity::Avanzado);
    }

    #[test]
    fn hard_class_below_floor_does_not_escalate() {
        // 0.9 * 0.025 = 0.0225: hard class present but under the floor
        let boxes = vec![boxed("crack", 0.25, 0.1, Some(0.8))];
        assert_eq!(infer_severity(&boxes), Severity::Intermedio);
    }

    #[test]
    fn fallback_tiers_follow_byte_size() {
        assert_eq!(
            fallback_from_upload(UploadHint { byte_size: 500_000 }),
            (Severity::Bajo, "scratch")
        );
        assert_eq!(
            fallback_from_upload(UploadHint {
                byte_size: 1_000_000
            }),
            (Severity::Intermedio, "paint_damage")
        );
        assert_eq!(
            fallback_from_upload(UploadHint {
                byte_size: 2_000_000
            }),
            (Severity::Avanzado, "dent")
        );
    }
}
