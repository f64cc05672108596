use super::classes::normalize_class;
use super::domain::{DiyGuide, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Categories considered friendly enough for a do-it-yourself guide.
static FRIENDLY_DIY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "scratch",
        "paint_damage",
        "bumper_scuff",
        "dent",
        "door_ding",
        "paint_transfer",
        "headlight_restore",
        "plastic_bumper_crack_small",
        "clearcoat_chip",
        "rust_corrosion",
        "flat_tire",
    ]
    .into_iter()
    .collect()
});

static SCUFF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(bumper).*scuff|(^|_)scuff").expect("scuff pattern compiles"));
static DING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(door).*ding|(^|_)ding").expect("ding pattern compiles"));
static HEADLIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"headlight|faro|haze|yellow").expect("headlight pattern compiles"));
static CLEARCOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"clearcoat|chip").expect("clearcoat pattern compiles"));
static PLASTIC_CRACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(plastic).*crack|bumper.*crack").expect("plastic-crack pattern compiles")
});

/// Second canonicalization pass mapping categories and their synonyms onto
/// guide-library keys. Ordered, first match wins.
pub(crate) fn map_to_diy_key(raw: &str) -> String {
    let k = normalize_class(raw);
    if k.contains("transfer") {
        return "paint_transfer".to_string();
    }
    if SCUFF.is_match(&k) {
        return "bumper_scuff".to_string();
    }
    if DING.is_match(&k) {
        return "door_ding".to_string();
    }
    if HEADLIGHT.is_match(&k) {
        return "headlight_restore".to_string();
    }
    if CLEARCOAT.is_match(&k) {
        return "clearcoat_chip".to_string();
    }
    if PLASTIC_CRACK.is_match(&k) {
        return "plastic_bumper_crack_small".to_string();
    }
    k
}

fn guide(title: &str, steps: &[&str]) -> DiyGuide {
    DiyGuide {
        title: title.to_string(),
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

/// Curated guide library, keyed by DIY key.
static DIY_LIBRARY: Lazy<BTreeMap<&'static str, DiyGuide>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "scratch",
            guide(
                "Pulido de rayón leve (sin traspasar barniz)",
                &[
                    "Lava y seca el área.",
                    "Enmascara orillas con cinta.",
                    "Aplica compuesto pulidor (corte medio) en pad de espuma.",
                    "Pulir con presión ligera, 30–60 s por pasada.",
                    "Microfibra para retirar residuo y revisar.",
                ],
            ),
        ),
        (
            "paint_damage",
            guide(
                "Retoque puntual de pintura",
                &[
                    "Desengrasa con isopropílico.",
                    "Lija suave si hay rebabas (grano 2000).",
                    "Aplica capas finas de pintura de retoque.",
                    "Cura y sella con barniz.",
                    "Pulido ligero de integración.",
                ],
            ),
        ),
        (
            "dent",
            guide(
                "PDR casero (golpe pequeño sin romper pintura)",
                &[
                    "Calienta ligeramente el panel.",
                    "Coloca ventosa/tab en el centro del golpe.",
                    "Tira con incrementos cortos.",
                    "Corrige alta/baja con martillo de teflón.",
                ],
            ),
        ),
        (
            "door_ding",
            guide(
                "Ding de puerta con kit de ventosa",
                &[
                    "Limpia y marca el centro.",
                    "Pega tab pequeño con pegamento.",
                    "Tira con golpes cortos.",
                    "Corrige perímetro con puntero.",
                ],
            ),
        ),
        (
            "headlight_restore",
            guide(
                "Restauración de faro opaco",
                &[
                    "Enmascara el contorno.",
                    "Lija progresivo 1000→2000 en húmedo.",
                    "Pulido plástico hasta transparencia.",
                    "Sellador UV para proteger.",
                ],
            ),
        ),
        (
            "paint_transfer",
            guide(
                "Quitar transferencia de pintura sin repintar",
                &[
                    "APC/citrus en la marca, 1–2 min.",
                    "Frota con clay bar o borrador melamínico suave.",
                    "Pulido suave para recuperar brillo.",
                ],
            ),
        ),
        (
            "rust_corrosion",
            guide(
                "Tratamiento de óxido superficial",
                &[
                    "Lija hasta metal sano.",
                    "Desengrasa.",
                    "Convertidor de óxido y primer anticorrosivo.",
                    "Color y barniz; pulido final.",
                ],
            ),
        ),
        (
            "plastic_bumper_crack_small",
            guide(
                "Grieta pequeña en defensa plástica",
                &[
                    "Bisela por detrás; desengrasa.",
                    "Resina/epoxi + malla; curar.",
                    "Lijar/emplastar; fondo, color, barniz.",
                ],
            ),
        ),
        (
            "clearcoat_chip",
            guide(
                "Astilla de barniz (chip)",
                &[
                    "Limpia y desengrasa.",
                    "Gota de barniz en el chip.",
                    "Curado y pulido suave.",
                ],
            ),
        ),
        (
            "flat_tire",
            guide(
                "Reparación temporal de pinchazo (mecha)",
                &[
                    "Marca y extrae el objeto.",
                    "Agranda con herramienta en T.",
                    "Inserta mecha con pegamento.",
                    "Corta excedente; infla y revisa fugas.",
                ],
            ),
        ),
    ])
});

/// Returns a guide only for low/borderline severity on a friendly category.
pub(crate) fn pick_diy(
    category: &str,
    severity: Severity,
    area_pct: f64,
    intermedio_area_allowance: f64,
) -> Option<DiyGuide> {
    let small_intermedio =
        severity == Severity::Intermedio && area_pct <= intermedio_area_allowance;
    if !(severity == Severity::Bajo || small_intermedio) {
        return None;
    }

    let key = map_to_diy_key(category);
    if !FRIENDLY_DIY.contains(key.as_str()) {
        return None;
    }

    DIY_LIBRARY
        .get(key.as_str())
        .filter(|g| g.video_url.starts_with("http"))
        .cloned()
}

/// One entry of the browsable guide catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideCard {
    pub id: &'static str,
    pub title: &'static str,
    pub difficulty: &'static str,
    pub time: &'static str,
    pub video_url: String,
    pub steps: Vec<&'static str>,
    pub tags: Vec<&'static str>,
}

fn card(
    id: &'static str,
    title: &'static str,
    difficulty: &'static str,
    time: &'static str,
    video_id: &str,
    steps: &[&'static str],
    tags: &[&'static str],
) -> GuideCard {
    GuideCard {
        id,
        title,
        difficulty,
        time,
        video_url: format!("https://www.youtube.com/watch?v={video_id}"),
        steps: steps.to_vec(),
        tags: tags.to_vec(),
    }
}

static GUIDE_CATALOG: Lazy<Vec<GuideCard>> = Lazy::new(|| {
    vec![
        card(
            "rayon-ligero",
            "Eliminar rayón ligero con pulido",
            "Fácil",
            "20–30 min",
            "dQw4w9WgXcQ",
            &[
                "Lavar área con agua y jabón neutro",
                "Aplicar compuesto pulidor con pad de espuma",
                "Pulir en movimientos circulares sin presionar de más",
                "Retirar exceso y revisar a contraluz",
            ],
            &["pintura", "pulido", "rayón"],
        ),
        card(
            "raspon-parachoques",
            "Raspones en defensa (retoque rápido)",
            "Media",
            "35–50 min",
            "M3r2XDceM6A",
            &[
                "Desengrasar con alcohol isopropílico",
                "Lijar suave (grano 2000) en húmedo",
                "Aplicar pintura de retoque del color",
                "Sellar con barniz en pluma y pulir",
            ],
            &["parachoques", "barniz", "retoque"],
        ),
        card(
            "abolladura-pequena",
            "Abolladura pequeña sin pintura (PDR casero)",
            "Media",
            "25–40 min",
            "kXYiU_JCYtU",
            &[
                "Calentar suavemente el área (secadora de pelo)",
                "Usar ventosa/plunger para traccionar",
                "Golpecitos por perímetro con martillo de goma",
                "Revisar reflejos hasta nivelar",
            ],
            &["PDR", "abolladura", "carrocería"],
        ),
        card(
            "piedritas-cofre",
            "Piedritas en cofre (retoque puntual)",
            "Fácil",
            "15–25 min",
            "eVTXPUF4Oz4",
            &[
                "Limpiar con desengrasante",
                "Aplicar primer en microgota",
                "Pintura base con palillo",
                "Sellar con gota de barniz UV",
            ],
            &["cofre", "retoque", "primer"],
        ),
        card(
            "plastico-negro",
            "Restaurar plásticos negros exteriores",
            "Fácil",
            "10–20 min",
            "ktvTqknDobU",
            &[
                "Limpieza profunda con APC",
                "Aplicar restaurador en capa fina",
                "Dejar curar 10–15 min",
                "Repetir si es necesario",
            ],
            &["detailing", "plástico", "exteriores"],
        ),
        card(
            "mancha-resina",
            "Quitar resina/contaminación sin dañar pintura",
            "Media",
            "20–30 min",
            "YQHsXMglC9A",
            &[
                "Aplicar descontaminante (tar/bug) localmente",
                "Esperar el tiempo indicado",
                "Retirar con microfibra limpia",
                "Proteger con sellador",
            ],
            &["resina", "contaminación", "detailing"],
        ),
    ]
});

pub fn guide_catalog() -> &'static [GuideCard] {
    &GUIDE_CATALOG
}

/// Substring search across title, difficulty, time, tags, and steps.
pub fn search_catalog(query: &str) -> Vec<&'static GuideCard> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return GUIDE_CATALOG.iter().collect();
    }

    GUIDE_CATALOG
        .iter()
        .filter(|g| {
            let mut haystack = vec![g.title, g.difficulty, g.time];
            haystack.extend(g.tags.iter().copied());
            haystack.extend(g.steps.iter().copied());
            haystack.join(" ").to_lowercase().contains(&needle)
        })
        .collect()
}
