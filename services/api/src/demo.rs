use clap::Args;
use fixitbot::error::AppError;
use fixitbot::estimator::domain::{DetectionBox, EstimateResult, UploadHint};
use fixitbot::estimator::EstimateEngine;
use fixitbot::report::render_report;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Path to a JSON array of detection boxes
    #[arg(long)]
    pub(crate) boxes: PathBuf,
    /// Byte size of the original upload; enables the file-size fallback
    #[arg(long)]
    pub(crate) upload_bytes: Option<u64>,
    /// Also write the PDF report to this path
    #[arg(long)]
    pub(crate) pdf: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.boxes)?;
    let boxes: Vec<DetectionBox> = serde_json::from_str(&raw)?;

    let engine = EstimateEngine::with_defaults();
    let hint = args.upload_bytes.map(|byte_size| UploadHint { byte_size });
    let result = engine.estimate(&boxes, hint);

    render_result(&result);

    if let Some(path) = args.pdf {
        let bytes = render_report(&result, None)?;
        std::fs::write(&path, bytes)?;
        println!("\nPDF report written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(_args: DemoArgs) -> Result<(), AppError> {
    let engine = EstimateEngine::with_defaults();

    println!("Hood dent, confident detection");
    let boxes = vec![DetectionBox {
        x: 0.3,
        y: 0.1,
        w: 0.3,
        h: 0.2,
        cls: "hood dent".to_string(),
        score: Some(0.8),
    }];
    render_result(&engine.estimate(&boxes, None));

    println!("\nNo usable detections, 500 KB upload");
    render_result(&engine.estimate(
        &[],
        Some(UploadHint {
            byte_size: 500_000,
        }),
    ));

    Ok(())
}

fn render_result(result: &EstimateResult) {
    println!("Severity: {}", result.severity.label());
    println!("Area: {}", result.area);
    println!("Category: {}", result.category);
    println!("Estimate: ${} MXN", result.estimate);

    println!("\nBreakdown");
    println!(
        "- base {} x severity {:.2} x area {:.3} (damaged area {:.1}%)",
        result.breakdown.base,
        result.breakdown.sev_factor,
        result.breakdown.area_factor,
        result.area_pct * 100.0
    );
    for part in &result.detailed_breakdown {
        println!("- {} | {} | base {}", part.part, part.zone, part.base);
    }

    if !result.insights.top_classes.is_empty() {
        println!("\nTop classes");
        for entry in &result.insights.top_classes {
            println!("- {} ({:.4})", entry.cls, entry.weight);
        }
    }

    if result.insights.recommend_workshop {
        println!("\nWorkshop visit recommended");
    }

    if let Some(diy) = &result.diy {
        println!("\nDIY: {}", diy.title);
        for (index, step) in diy.steps.iter().enumerate() {
            println!("  {}. {}", index + 1, step);
        }
        println!("  video: {}", diy.video_url);
    }

    if let Some(note) = &result.note {
        println!("\nNote: {note}");
    }
}
