use super::classes::normalize_class;
use super::domain::DetectionBox;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Classes the detection model is trusted on. Anything else is treated as a
/// false positive and dropped before pricing.
static ALLOWED_CLASSES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "dent",
        "scratch",
        "paint_damage",
        "door_ding",
        "bumper_damage",
        "front-bumper-dent",
    ]
    .into_iter()
    .collect()
});

/// Anti-false-positive filter: drops low-confidence boxes, sub-threshold
/// slivers, and unrecognized classes. Survivors keep their order and are
/// never mutated. A box without a score passes the confidence gate; the
/// severity classifier applies its own default downstream.
pub(crate) fn post_filter(
    boxes: &[DetectionBox],
    min_score: f64,
    min_area: f64,
) -> Vec<DetectionBox> {
    boxes
        .iter()
        .filter(|b| b.score.map_or(true, |s| s >= min_score))
        .filter(|b| b.area() >= min_area)
        .filter(|b| {
            let raw = b.cls.to_lowercase();
            ALLOWED_CLASSES.contains(raw.as_str())
                || ALLOWED_CLASSES.contains(normalize_class(&raw).as_str())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_SCORE: f64 = 0.60;
    const MIN_AREA: f64 = 0.015;

    fn boxed(cls: &str, w: f64, h: f64, score: Option<f64>) -> DetectionBox {
        DetectionBox {
            x: 0.2,
            y: 0.2,
            w,
            h,
            cls: cls.to_string(),
            score,
        }
    }

    #[test]
    fn drops_low_confidence_boxes() {
        let boxes = vec![boxed("dent", 0.3, 0.3, Some(0.3))];
        assert!(post_filter(&boxes, MIN_SCORE, MIN_AREA).is_empty());
    }

    #[test]
    fn keeps_boxes_without_a_score() {
        let boxes = vec![boxed("dent", 0.3, 0.3, None)];
        assert_eq!(post_filter(&boxes, MIN_SCORE, MIN_AREA).len(), 1);
    }

    #[test]
    fn drops_sub_threshold_slivers() {
        let boxes = vec![boxed("dent", 0.1, 0.1, Some(0.9))];
        assert!(post_filter(&boxes, MIN_SCORE, MIN_AREA).is_empty());
    }

    #[test]
    fn drops_unrecognized_classes() {
        let boxes = vec![boxed("license_plate", 0.3, 0.3, Some(0.9))];
        assert!(post_filter(&boxes, MIN_SCORE, MIN_AREA).is_empty());
    }

    #[test]
    fn raw_allow_list_entries_survive() {
        let boxes = vec![boxed("front-bumper-dent", 0.3, 0.3, Some(0.9))];
        assert_eq!(post_filter(&boxes, MIN_SCORE, MIN_AREA).len(), 1);
    }

    #[test]
    fn output_is_an_ordered_subset_of_input() {
        let boxes = vec![
            boxed("dent", 0.3, 0.3, Some(0.9)),
            boxed("license_plate", 0.3, 0.3, Some(0.9)),
            boxed("scratch", 0.2, 0.2, Some(0.8)),
        ];
        let filtered = post_filter(&boxes, MIN_SCORE, MIN_AREA);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0], boxes[0]);
        assert_eq!(filtered[1], boxes[2]);
    }
}
