use fixitbot::estimator::domain::{DetectionBox, Severity, UploadHint};
use fixitbot::estimator::EstimateEngine;

fn boxed(cls: &str, x: f64, y: f64, w: f64, h: f64, score: Option<f64>) -> DetectionBox {
    DetectionBox {
        x,
        y,
        w,
        h,
        cls: cls.to_string(),
        score,
    }
}

#[test]
fn hood_dent_prices_from_the_matrix() {
    let engine = EstimateEngine::with_defaults();
    // Weighted area 0.9 * 0.06 = 0.054 -> intermedio; cofre zone.
    let boxes = vec![boxed("hood dent", 0.3, 0.1, 0.3, 0.2, Some(0.8))];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.severity, Severity::Intermedio);
    assert_eq!(result.category, "dent");
    assert_eq!(result.area, "cofre");
    assert_eq!(result.breakdown.base, 1100);
    assert_eq!(result.breakdown.zone, "hood");
    // 1100 * 1.3 * (1 + 0.06 * 1.5) = 1558.7
    assert_eq!(result.estimate, 1559);
}

#[test]
fn large_confident_dent_escalates_to_avanzado() {
    let engine = EstimateEngine::with_defaults();
    // Weighted area 0.9 * 0.09 = 0.081 crosses the avanzado threshold even
    // though "dent" is not a hard class.
    let boxes = vec![boxed("dent", 0.1, 0.1, 0.3, 0.3, Some(0.8))];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.severity, Severity::Avanzado);
    assert_eq!(result.breakdown.base, 900);
    // 900 * 1.6 * (1 + 0.09 * 1.5) = 1634.4
    assert_eq!(result.estimate, 1634);
    assert!(result.insights.recommend_workshop);
    assert!(result.diy.is_none());
}

#[test]
fn fallback_upload_drives_the_result_when_nothing_survives() {
    let engine = EstimateEngine::with_defaults();
    let result = engine.estimate(&[], Some(UploadHint { byte_size: 500_000 }));

    assert_eq!(result.severity, Severity::Bajo);
    assert_eq!(result.category, "scratch");
    assert_eq!(result.area, "componente exterior (estimado)");
    assert!((result.area_pct - 0.0).abs() < 1e-12);
    // scratch has no entry for the default zone key: category default 400.
    assert_eq!(result.breakdown.base, 400);
    assert_eq!(result.estimate, 400);
    let diy = result.diy.expect("scratch is DIY friendly");
    assert!(diy.video_url.starts_with("http"));
}

#[test]
fn below_threshold_box_falls_through_to_no_detections() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![boxed("dent", 0.1, 0.1, 0.3, 0.3, Some(0.3))];
    let result = engine.estimate(&boxes, None);

    assert!(result.boxes.is_empty());
    assert_eq!(result.severity, Severity::Bajo);
    assert_eq!(result.category, "scratch");
    assert_eq!(result.area, "zona no identificada");
}

#[test]
fn replacement_override_fires_for_severe_extensive_door_damage() {
    let engine = EstimateEngine::with_defaults();
    // Area 0.152 > 0.10, weighted 0.95 * 0.152 -> avanzado, zone door_panel.
    let boxes = vec![boxed("door dent", 0.3, 0.3, 0.4, 0.38, Some(0.9))];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.severity, Severity::Avanzado);
    assert_eq!(result.category, "reemplazo_de_pieza");
    assert_eq!(result.breakdown.base, 3500);
    assert!((result.breakdown.sev_factor - 1.0).abs() < 1e-12);
    assert_eq!(result.detailed_breakdown[0].base, 3500);
    assert!(result.note.expect("replacement note").contains("reemplazo"));
    // 3500 * 1.0 * (1 + 0.152 * 1.5) = 4298
    assert_eq!(result.estimate, 4298);
}

#[test]
fn distinct_zone_labels_price_once_each() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![
        // Two door boxes collapse onto one "puerta (central)" line.
        boxed("door scratch", 0.4, 0.35, 0.15, 0.15, Some(0.9)),
        boxed("door scratch", 0.45, 0.4, 0.15, 0.15, Some(0.85)),
        boxed("hood scratch", 0.4, 0.05, 0.2, 0.2, Some(0.9)),
    ];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.detailed_breakdown.len(), 2);
    assert_eq!(result.area, "puerta (central) y cofre");
    // scratch: door_panel 400 + hood 450
    assert_eq!(result.breakdown.base, 850);
    assert_eq!(result.breakdown.zone, "multiple");
}

#[test]
fn area_pct_is_capped_at_one() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![
        boxed("dent", 0.1, 0.1, 0.8, 0.8, Some(0.9)),
        boxed("dent", 0.1, 0.1, 0.8, 0.8, Some(0.9)),
        boxed("dent", 0.1, 0.1, 0.8, 0.8, Some(0.9)),
    ];
    let result = engine.estimate(&boxes, None);
    assert!((result.area_pct - 1.0).abs() < 1e-12);
    assert!(result.breakdown.area_pct <= 1.0);
}

#[test]
fn filtered_survivors_are_an_ordered_subset() {
    let engine = EstimateEngine::with_defaults();
    let keep_a = boxed("dent", 0.1, 0.1, 0.2, 0.2, Some(0.9));
    let drop_low = boxed("dent", 0.3, 0.3, 0.2, 0.2, Some(0.2));
    let keep_b = boxed("scratch", 0.5, 0.5, 0.2, 0.2, Some(0.8));
    let result = engine.estimate(&[keep_a.clone(), drop_low, keep_b.clone()], None);

    assert_eq!(result.boxes, vec![keep_a, keep_b]);
}

#[test]
fn recomputation_is_idempotent() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![
        boxed("dent", 0.1, 0.1, 0.25, 0.25, Some(0.8)),
        boxed("scratch", 0.5, 0.5, 0.2, 0.2, Some(0.7)),
    ];

    let first = engine.estimate(&boxes, None);
    let second = engine.estimate(&boxes, None);
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).expect("serializes");
    let second_json = serde_json::to_string(&second).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn feeding_result_boxes_back_reproduces_the_result() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![
        boxed("dent", 0.1, 0.1, 0.25, 0.25, Some(0.8)),
        boxed("license_plate", 0.6, 0.6, 0.2, 0.2, Some(0.9)),
    ];

    let original = engine.estimate(&boxes, None);
    let recomputed = engine.estimate(&original.boxes, None);
    assert_eq!(original, recomputed);
}

#[test]
fn severity_never_decreases_as_confidence_grows() {
    let engine = EstimateEngine::with_defaults();
    let tiers: Vec<Severity> = [0.2, 0.6, 0.75, 0.95]
        .iter()
        .map(|score| {
            let boxes = vec![boxed("dent", 0.1, 0.1, 0.25, 0.25, Some(*score))];
            engine.estimate(&boxes, None).severity
        })
        .collect();

    assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn hard_class_with_enough_area_escalates() {
    let engine = EstimateEngine::with_defaults();
    // Normalizes to paint_damage (allow-listed), but the hard-class check
    // runs on the raw string, which still carries "crack".
    let boxes = vec![boxed("paint crack", 0.3, 0.75, 0.25, 0.2, Some(0.7))];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.severity, Severity::Avanzado);
    assert_eq!(result.category, "paint_damage");
    assert!(result.insights.recommend_workshop);
}

#[test]
fn top_classes_rank_by_weighted_area_and_cap_at_three() {
    let engine = EstimateEngine::with_defaults();
    let boxes = vec![
        boxed("scratch", 0.05, 0.05, 0.15, 0.15, Some(0.9)),
        boxed("dent", 0.3, 0.3, 0.3, 0.3, Some(0.9)),
        boxed("door ding", 0.7, 0.45, 0.15, 0.15, Some(0.8)),
        boxed("paint damage", 0.05, 0.45, 0.14, 0.14, Some(0.7)),
    ];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.insights.top_classes.len(), 3);
    assert_eq!(result.insights.top_classes[0].cls, "dent");
    let weights: Vec<f64> = result
        .insights
        .top_classes
        .iter()
        .map(|entry| entry.weight)
        .collect();
    assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn small_intermedio_scratch_keeps_its_diy_guide() {
    let engine = EstimateEngine::with_defaults();
    // Weighted 0.925 * 0.0255 ~= 0.0236 -> intermedio, area under 0.03.
    let boxes = vec![boxed("scratch", 0.4, 0.45, 0.17, 0.15, Some(0.85))];
    let result = engine.estimate(&boxes, None);

    assert_eq!(result.severity, Severity::Intermedio);
    assert!(result.area_pct <= 0.03);
    assert!(result.diy.is_some());
}
