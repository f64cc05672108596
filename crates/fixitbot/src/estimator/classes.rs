use super::domain::DetectionBox;
use once_cell::sync::Lazy;
use regex::Regex;

/// Classes that point at structural damage regardless of the detected area.
/// Tested against the raw class string, misspellings of "corrosion" included.
static HARD_CLASSES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(crack|lamp(_|\s)?broken|rust|corri?s(i|o)n|flat(_|\s)?tire|glass(_|\s)?shatter)")
        .expect("hard-class pattern compiles")
});

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("separator pattern compiles"));

static CORROSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"corri?s(i|o)n").expect("corrosion pattern compiles"));

pub fn is_hard_class(raw: &str) -> bool {
    HARD_CLASSES.is_match(raw)
}

/// Lower-cases and collapses whitespace/hyphen runs to underscores.
pub fn clean_label(raw: &str) -> String {
    SEPARATORS
        .replace_all(&raw.to_lowercase(), "_")
        .into_owned()
}

/// Canonicalizes a free-text damage label. The rules form an ordered
/// first-match chain; precedence is load-bearing (a label containing both
/// "door" and "paint" resolves to paint_damage because that rule runs
/// first). Unmatched labels pass through in their cleaned form.
pub fn normalize_class(raw: &str) -> String {
    let k = clean_label(raw);
    if k.contains("paint") {
        return "paint_damage".to_string();
    }
    if k.contains("lamp") && k.contains("broken") {
        return "lamp_broken".to_string();
    }
    if k.contains("flat") && k.contains("tire") {
        return "flat_tire".to_string();
    }
    if k.contains("rust") || CORROSION.is_match(&k) {
        return "rust_corrosion".to_string();
    }
    if k.contains("scratch") {
        return "scratch".to_string();
    }
    if k.contains("dent") {
        return "dent".to_string();
    }
    if k.contains("crack") {
        return "crack".to_string();
    }
    if k.contains("glass") && k.contains("shatter") {
        return "glass_shatter".to_string();
    }
    if k.contains("bumper") && k.contains("damage") {
        return "bumper_damage".to_string();
    }
    if k.contains("door") && k.contains("ding") {
        return "door_ding".to_string();
    }
    k
}

/// Class with the largest accumulated box area. Confidence is deliberately
/// ignored here; the severity classifier weighs it instead.
pub(crate) fn dominant_category(boxes: &[DetectionBox]) -> String {
    let mut accumulated: Vec<(String, f64)> = Vec::new();
    for b in boxes {
        let cls = normalize_class(&b.cls);
        match accumulated.iter_mut().find(|(key, _)| *key == cls) {
            Some((_, area)) => *area += b.area(),
            None => accumulated.push((cls, b.area())),
        }
    }

    let mut best = "scratch".to_string();
    let mut best_area = 0.0;
    for (cls, area) in accumulated {
        if area > best_area {
            best = cls;
            best_area = area;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(cls: &str, w: f64, h: f64) -> DetectionBox {
        DetectionBox {
            x: 0.1,
            y: 0.1,
            w,
            h,
            cls: cls.to_string(),
            score: Some(0.9),
        }
    }

    #[test]
    fn cleans_separators_and_case() {
        assert_eq!(clean_label("Front-Bumper  Dent"), "front_bumper_dent");
    }

    #[test]
    fn paint_rule_wins_over_door() {
        assert_eq!(normalize_class("door paint chip"), "paint_damage");
    }

    #[test]
    fn lamp_requires_broken() {
        assert_eq!(normalize_class("lamp broken"), "lamp_broken");
        assert_eq!(normalize_class("lamp haze"), "lamp_haze");
    }

    #[test]
    fn tolerates_corrosion_misspellings() {
        assert_eq!(normalize_class("corrosion"), "rust_corrosion");
        assert_eq!(normalize_class("corrision"), "rust_corrosion");
        assert_eq!(normalize_class("surface rust"), "rust_corrosion");
    }

    #[test]
    fn unmatched_labels_pass_through_cleaned() {
        assert_eq!(normalize_class("Mystery Mark"), "mystery_mark");
    }

    #[test]
    fn hard_classes_match_raw_strings() {
        assert!(is_hard_class("glass shatter"));
        assert!(is_hard_class("lamp_broken"));
        assert!(is_hard_class("flat tire"));
        assert!(!is_hard_class("dent"));
        assert!(!is_hard_class("scratch"));
    }

    #[test]
    fn dominant_category_picks_largest_accumulated_area() {
        let boxes = vec![
            boxed("scratch", 0.1, 0.1),
            boxed("dent", 0.2, 0.2),
            boxed("scratch", 0.1, 0.2),
        ];
        assert_eq!(dominant_category(&boxes), "dent");
    }

    #[test]
    fn dominant_category_defaults_to_scratch() {
        assert_eq!(dominant_category(&[]), "scratch");
    }

    #[test]
    fn dominant_category_ties_keep_first_seen() {
        let boxes = vec![boxed("dent", 0.1, 0.1), boxed("crack", 0.1, 0.1)];
        assert_eq!(dominant_category(&boxes), "dent");
    }
}
