use super::domain::{DetectionBox, ZoneKey};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel shown when nothing survived the post-filter.
pub(crate) const UNIDENTIFIED_ZONE: &str = "zona no identificada";

static QUARTER_PANEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"quarter[_\s]?panel|costado").expect("quarter-panel pattern compiles"));

fn horizontal_side(cx: f64) -> &'static str {
    if cx < 0.33 {
        "izquierdo"
    } else if cx > 0.66 {
        "derecho"
    } else {
        "central"
    }
}

fn vertical_band(cy: f64) -> &'static str {
    if cy < 0.4 {
        "superior"
    } else if cy > 0.7 {
        "inferior"
    } else {
        "media"
    }
}

/// Human-readable Spanish area labels for the surviving boxes, deduplicated
/// in insertion order. The class-hint chain is ordered: a box in the lower
/// band reads as a bumper before any door/fender hint is considered.
pub(crate) fn area_labels(boxes: &[DetectionBox]) -> Vec<String> {
    if boxes.is_empty() {
        return vec![UNIDENTIFIED_ZONE.to_string()];
    }

    let mut labels: Vec<String> = Vec::new();
    for b in boxes {
        let (cx, cy) = b.centroid();
        let side = horizontal_side(cx);
        let vpos = vertical_band(cy);
        let cls = b.cls.to_lowercase();

        let part = if cls.contains("lamp") || cls.contains("headlight") {
            format!("faro ({side})")
        } else if cls.contains("tire") || cls.contains("llanta") {
            format!("llanta ({side})")
        } else if cls.contains("mirror") || cls.contains("espejo") {
            format!("espejo ({side})")
        } else if vpos == "inferior" || cls.contains("bumper") || cls.contains("defensa") {
            format!("defensa ({side})")
        } else if cls.contains("door") || cls.contains("puerta") {
            format!("puerta ({side})")
        } else if cls.contains("fender") || cls.contains("salpicadera") {
            format!("salpicadera ({side})")
        } else if cls.contains("hood") || cls.contains("cofre") {
            "cofre".to_string()
        } else if cls.contains("roof") || cls.contains("techo") {
            "techo".to_string()
        } else if cls.contains("trunk") || cls.contains("cajuela") {
            "cajuela".to_string()
        } else if QUARTER_PANEL.is_match(&cls) {
            format!("costado ({side})")
        } else {
            format!("panel ({side} {vpos})")
        };

        if !labels.contains(&part) {
            labels.push(part);
        }
    }
    labels
}

/// Pricing key for a human-readable area label. Independent from the label
/// chain above so the two tables can evolve separately.
pub(crate) fn zone_key(area_label: &str) -> ZoneKey {
    let label = area_label.to_lowercase();
    if label.contains("puerta") || label.contains("door") {
        ZoneKey::DoorPanel
    } else if label.contains("salpicadera") || label.contains("fender") {
        ZoneKey::DoorPanel
    } else if label.contains("defensa") || label.contains("bumper") {
        ZoneKey::Bumper
    } else if label.contains("cofre") || label.contains("hood") {
        ZoneKey::Hood
    } else if label.contains("techo") || label.contains("roof") {
        ZoneKey::Roof
    } else if label.contains("costado") || label.contains("quarter_panel") {
        ZoneKey::SidePanel
    } else if label.contains("faro") || label.contains("lamp") || label.contains("headlight") {
        ZoneKey::Lamp
    } else if label.contains("llanta") || label.contains("tire") {
        ZoneKey::Tire
    } else if label.contains("cristal") || label.contains("glass") {
        ZoneKey::Glass
    } else if label.contains("espejo") || label.contains("mirror") {
        ZoneKey::Mirror
    } else {
        ZoneKey::Default
    }
}
