use super::classes::{is_hard_class, normalize_class};
use super::domain::{DetectionBox, Severity, TopClassEntry};
use std::cmp::Ordering;

/// Canonical classes ranked by confidence-weighted area, descending. A box
/// without a score weighs in at factor 0.5, not the severity default.
pub(crate) fn top_classes(boxes: &[DetectionBox]) -> Vec<TopClassEntry> {
    let mut accumulated: Vec<(String, f64)> = Vec::new();
    for b in boxes {
        let cls = normalize_class(&b.cls);
        let weight = b.area()
            * b.score
                .map_or(0.5, |s| 0.5 + 0.5 * s.clamp(0.0, 1.0));
        match accumulated.iter_mut().find(|(key, _)| *key == cls) {
            Some((_, total)) => *total += weight,
            None => accumulated.push((cls, weight)),
        }
    }

    accumulated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    accumulated
        .into_iter()
        .map(|(cls, weight)| TopClassEntry { cls, weight })
        .collect()
}

/// Whether the result should steer the user toward a professional workshop.
pub(crate) fn recommend_workshop(
    severity: Severity,
    area_pct: f64,
    boxes: &[DetectionBox],
    area_threshold: f64,
) -> bool {
    severity == Severity::Avanzado
        || area_pct > area_threshold
        || boxes.iter().any(|b| is_hard_class(&b.cls))
}
