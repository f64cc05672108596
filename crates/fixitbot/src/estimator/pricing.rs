use super::domain::ZoneKey;

/// Base cost when the category itself is unknown to the price book.
pub(crate) const UNKNOWN_CATEGORY_BASE: u32 = 850;

pub(crate) const REPLACEMENT_CATEGORY: &str = "reemplazo_de_pieza";
pub(crate) const REPLACEMENT_NOTE: &str =
    "El daño es extenso y severo: se cotiza el reemplazo de la pieza principal.";

/// Damaged-area fraction beyond which the area factor stops growing.
const AREA_FACTOR_CAP: f64 = 0.25;
const AREA_FACTOR_GAIN: f64 = 1.5;

/// Base repair cost per (category, zone); local-workshop price book.
/// Unknown zones fall back to the category default.
pub(crate) fn base_cost(category: &str, zone: ZoneKey) -> u32 {
    use ZoneKey::*;
    match category {
        "scratch" => match zone {
            Bumper => 300,
            DoorPanel => 400,
            Hood => 450,
            SidePanel => 500,
            Roof => 600,
            _ => 400,
        },
        "dent" => match zone {
            Bumper => 600,
            DoorPanel => 750,
            Hood => 1100,
            SidePanel => 1200,
            Roof => 1500,
            _ => 900,
        },
        "door_ding" => match zone {
            DoorPanel => 500,
            SidePanel => 600,
            _ => 550,
        },
        "paint_damage" => match zone {
            Mirror => 400,
            Bumper => 650,
            DoorPanel => 900,
            Hood => 1200,
            SidePanel => 1100,
            Roof => 1000,
            _ => 800,
        },
        "lamp_broken" => 1200,
        "glass_shatter" => 1500,
        "crack" => match zone {
            Bumper => 950,
            _ => 1100,
        },
        "rust_corrosion" => match zone {
            DoorPanel => 800,
            SidePanel => 1000,
            _ => 900,
        },
        "flat_tire" => 150,
        "headlight_restore" => 500,
        _ => UNKNOWN_CATEGORY_BASE,
    }
}

/// Flat part-replacement price when damage is both severe and extensive.
pub(crate) fn replacement_cost(zone: ZoneKey) -> u32 {
    use ZoneKey::*;
    match zone {
        DoorPanel => 3500,
        Bumper => 2800,
        Hood => 4000,
        SidePanel => 3800,
        Lamp => 1800,
        _ => 3000,
    }
}

/// Area multiplier; the damaged-area contribution is capped, not normalized.
pub(crate) fn area_factor(area_pct: f64) -> f64 {
    1.0 + area_pct.min(AREA_FACTOR_CAP) * AREA_FACTOR_GAIN
}
