use crate::estimator::domain::{EstimateResult, Severity};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Local;
use printpdf::image_crate::GenericImageView;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfLayerReference, Rgb,
};
use tracing::debug;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 22.0;
const BODY_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const EVIDENCE_MAX_HEIGHT_MM: f64 = 80.0;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to assemble the PDF document: {0}")]
    Pdf(String),
}

struct SeverityBadge {
    text: &'static str,
    detail: &'static str,
    color: Color,
}

fn severity_badge(severity: Severity) -> SeverityBadge {
    match severity {
        Severity::Avanzado => SeverityBadge {
            text: "AVANZADO",
            detail: "Reparación profesional indispensable.",
            color: Color::Rgb(Rgb::new(0.827, 0.184, 0.184, None)),
        },
        Severity::Intermedio => SeverityBadge {
            text: "INTERMEDIO",
            detail: "Se recomienda evaluación en taller.",
            color: Color::Rgb(Rgb::new(0.961, 0.486, 0.0, None)),
        },
        Severity::Bajo => SeverityBadge {
            text: "BAJO",
            detail: "Generalmente reparable con guías DIY.",
            color: Color::Rgb(Rgb::new(0.220, 0.557, 0.235, None)),
        },
    }
}

fn translate_category(category: &str) -> String {
    match category {
        "lamp_broken" => "Faro roto".to_string(),
        "scratch" => "Rayón / rasguño".to_string(),
        "dent" => "Abolladura".to_string(),
        "bumper_damage" => "Daño en defensa".to_string(),
        "door_ding" => "Golpe de puerta".to_string(),
        "glass_shatter" => "Cristal roto".to_string(),
        "paint_damage" => "Daño de pintura".to_string(),
        other => capitalize_words(&other.replace('_', " ")),
    }
}

fn capitalize_words(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a peso amount with thousands grouping, es-MX currency style.
fn format_mxn(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.abs();
    let units = cents / 100;
    let fraction = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fraction
    )
}

/// Accepts "data:image/...;base64,xxxx" or plain base64.
fn decode_evidence(image: &str) -> Option<Vec<u8>> {
    let payload = if image.starts_with("data:image") {
        image.split(";base64,").nth(1)?
    } else {
        image
    };
    BASE64.decode(payload.trim()).ok()
}

struct PageWriter {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f64,
}

impl PageWriter {
    fn text(&mut self, text: &str, size: f64, x: f64) {
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.cursor as f32), &self.regular);
    }

    fn bold_text(&mut self, text: &str, size: f64, x: f64) {
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.cursor as f32), &self.bold);
    }

    fn colored_bold_text(&mut self, text: &str, size: f64, x: f64, color: Color) {
        self.layer.set_fill_color(color);
        self.bold_text(text, size, x);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    fn advance(&mut self, mm: f64) {
        self.cursor -= mm;
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.text(key, 10.0, MARGIN_MM);
        self.bold_text(value, 10.0, MARGIN_MM + 70.0);
        self.advance(7.0);
    }

    fn amount_row(&mut self, label: &str, amount: &str) {
        self.text(label, 10.0, MARGIN_MM);
        self.bold_text(amount, 10.0, MARGIN_MM + BODY_WIDTH_MM - 35.0);
        self.advance(6.5);
    }
}

/// Renders the estimate as a one-page A4 report; `evidence` is an optional
/// base64 (or data-URL) copy of the analyzed photo. An undecodable evidence
/// payload is skipped, never fatal.
pub fn render_report(result: &EstimateResult, evidence: Option<&str>) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        "FixItBot - Reporte de Análisis",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "report",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| ReportError::Pdf(err.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| ReportError::Pdf(err.to_string()))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = PageWriter {
        layer,
        regular,
        bold,
        cursor: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    writer.bold_text("FixItBot — Reporte de Análisis", 20.0, MARGIN_MM + 18.0);
    writer.advance(8.0);
    writer.text(
        "Diagnóstico automático a partir de una fotografía. Estimación informativa.",
        9.0,
        MARGIN_MM + 28.0,
    );
    writer.advance(12.0);

    if let Some(bytes) = evidence.and_then(decode_evidence) {
        match printpdf::image_crate::load_from_memory(&bytes) {
            Ok(decoded) => {
                writer.bold_text("Evidencia", 13.0, MARGIN_MM);
                writer.advance(4.0);
                place_evidence(&mut writer, &decoded);
                writer.advance(8.0);
            }
            Err(err) => {
                debug!(error = %err, "evidence image skipped: undecodable");
            }
        }
    }

    let badge = severity_badge(result.severity);
    let category = translate_category(&result.category);

    writer.bold_text("Resumen", 13.0, MARGIN_MM);
    writer.advance(8.0);
    writer.text("Severidad", 10.0, MARGIN_MM);
    writer.colored_bold_text(badge.text, 10.0, MARGIN_MM + 70.0, badge.color);
    writer.advance(5.0);
    writer.text(badge.detail, 8.0, MARGIN_MM + 70.0);
    writer.advance(7.0);
    writer.key_value("Zona afectada", &result.area);
    writer.key_value("Tipo de daño", &category);
    writer.advance(6.0);

    let base = f64::from(result.breakdown.base);
    let sev_adjustment = base * (result.breakdown.sev_factor - 1.0);
    let area_adjustment = (base + sev_adjustment) * (result.breakdown.area_factor - 1.0);
    let area_pct_rounded = (result.breakdown.area_pct * 100.0).round();

    writer.bold_text("Cómo calculamos esta estimación", 13.0, MARGIN_MM);
    writer.advance(8.0);
    writer.amount_row(
        &format!("1) Costo base por \"{category}\"."),
        &format_mxn(base),
    );
    writer.amount_row(
        &format!(
            "2) Ajuste por severidad ({}).",
            badge.text.to_lowercase()
        ),
        &format!("+ {}", format_mxn(sev_adjustment)),
    );
    writer.amount_row(
        &format!("3) Ajuste por tamaño del área (aprox. {area_pct_rounded}%)."),
        &format!("+ {}", format_mxn(area_adjustment)),
    );
    writer.advance(2.0);
    writer.bold_text("Total estimado", 12.0, MARGIN_MM);
    writer.colored_bold_text(
        &format!("{} MXN", format_mxn(f64::from(result.estimate))),
        13.0,
        MARGIN_MM + BODY_WIDTH_MM - 45.0,
        Color::Rgb(Rgb::new(0.02, 0.588, 0.412, None)),
    );
    writer.advance(8.0);
    writer.text(
        "Notas: La estimación se basa en patrones promedio por tipo de daño y tamaño",
        8.0,
        MARGIN_MM,
    );
    writer.advance(4.0);
    writer.text(
        "aparente del área. El costo final puede variar según piezas ocultas, color,",
        8.0,
        MARGIN_MM,
    );
    writer.advance(4.0);
    writer.text("repuestos o condiciones del vehículo.", 8.0, MARGIN_MM);
    writer.advance(10.0);

    if let Some(note) = &result.note {
        writer.text(note, 8.0, MARGIN_MM);
        writer.advance(8.0);
    }

    if let Some(diy) = &result.diy {
        writer.bold_text("Opción DIY sugerida", 13.0, MARGIN_MM);
        writer.advance(7.0);
        writer.text(&diy.title, 10.0, MARGIN_MM);
        writer.advance(6.0);
        for (index, step) in diy.steps.iter().enumerate() {
            writer.text(&format!("{}. {}", index + 1, step), 9.0, MARGIN_MM + 4.0);
            writer.advance(5.0);
        }
        writer.advance(2.0);
        writer.text(
            "Si decides reparar por tu cuenta, revisa el video y sigue los pasos con precaución.",
            8.0,
            MARGIN_MM,
        );
        writer.advance(4.0);
        writer.text(
            "Para resultados profesionales o daños mayores, recomendamos acudir a un taller.",
            8.0,
            MARGIN_MM,
        );
        writer.advance(5.0);
        writer.colored_bold_text(
            &diy.video_url,
            9.0,
            MARGIN_MM,
            Color::Rgb(Rgb::new(0.145, 0.388, 0.922, None)),
        );
        writer.advance(8.0);
    }

    writer.cursor = MARGIN_MM;
    writer.text(
        &format!(
            "Reporte generado por FixItBot el {} — *Estimación preliminar sin efectos de cotización formal.",
            Local::now().format("%Y-%m-%d")
        ),
        8.0,
        MARGIN_MM + 2.0,
    );

    doc.save_to_bytes()
        .map_err(|err| ReportError::Pdf(err.to_string()))
}

fn place_evidence(writer: &mut PageWriter, decoded: &printpdf::image_crate::DynamicImage) {
    let (pixel_width, pixel_height) = decoded.dimensions();
    if pixel_width == 0 || pixel_height == 0 {
        return;
    }

    // Fit the photo to the body width, capped in height.
    let mut dpi = f64::from(pixel_width) * 25.4 / BODY_WIDTH_MM;
    let mut height_mm = f64::from(pixel_height) * 25.4 / dpi;
    if height_mm > EVIDENCE_MAX_HEIGHT_MM {
        dpi = f64::from(pixel_height) * 25.4 / EVIDENCE_MAX_HEIGHT_MM;
        height_mm = EVIDENCE_MAX_HEIGHT_MM;
    }

    writer.advance(height_mm);
    let image = Image::from_dynamic_image(decoded);
    image.add_to_layer(
        writer.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM as f32)),
            translate_y: Some(Mm(writer.cursor as f32)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
}
