//! Chart export tools
//!
//! Render today's calorie breakdown as a donut chart and the weekly rollup
//! as a 2x2 bar chart panel, written as PNG files.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::element::Pie;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use serde::Serialize;

use crate::aggregate::{calorie_breakdown, daily_totals, weekly_rollup, CalorieBreakdown, WeeklyRollup};
use crate::context::RequestContext;
use crate::db::Database;
use crate::models::{MacroKind, Macros};

use super::dashboard::load_window;
use super::{ToolError, ToolResult};

// ============================================================================
// Colors
// ============================================================================

const COLOR_CALORIES: RGBColor = RGBColor(0xFF, 0x6F, 0x61);
const COLOR_PROTEIN: RGBColor = RGBColor(0x6A, 0x5A, 0xCD);
const COLOR_CARBS: RGBColor = RGBColor(0xFF, 0xD7, 0x00);
const COLOR_FAT: RGBColor = RGBColor(0x3C, 0xB3, 0x71);

const DONUT_SIZE: (u32, u32) = (600, 600);
const PANEL_SIZE: (u32, u32) = (1000, 800);

fn macro_color(kind: MacroKind) -> RGBColor {
    match kind {
        MacroKind::Calories => COLOR_CALORIES,
        MacroKind::Protein => COLOR_PROTEIN,
        MacroKind::Carbs => COLOR_CARBS,
        MacroKind::Fat => COLOR_FAT,
    }
}

/// Response for export_charts
#[derive(Debug, Serialize)]
pub struct ExportChartsResponse {
    pub files: Vec<String>,
    /// Charts that were not written, with the reason
    pub skipped: Vec<String>,
}

// ============================================================================
// Rendering
// ============================================================================

/// Convert an RGB buffer to PNG bytes
fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Donut chart of calories from protein, carbs and fat
pub fn render_breakdown_donut(
    breakdown: &CalorieBreakdown,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    if breakdown.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let titled = root
            .titled("Macro Calorie Breakdown", ("sans-serif", 28))
            .map_err(|e| e.to_string())?;
        let (w, h) = titled.dim_in_pixel();

        let slices = breakdown.slices();
        let sizes: Vec<f64> = slices.iter().map(|s| s.kcal).collect();
        let colors = [COLOR_PROTEIN, COLOR_CARBS, COLOR_FAT];
        let labels: Vec<String> = slices
            .iter()
            .map(|s| format!("{} {}%", s.label, s.percent))
            .collect();

        let center = ((w / 2) as i32, (h / 2) as i32);
        let radius = f64::from(w.min(h)) * 0.35;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.donut_hole(radius * 0.5);
        pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
        titled.draw(&pie).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    encode_png(buffer, width, height)
}

/// Four bar charts (calories, protein, carbs, fat) over the weekly rollup
pub fn render_weekly_panel(rollup: &WeeklyRollup, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let labels: Vec<&str> = rollup.days.iter().map(|b| b.label).collect();

        for (area, kind) in root.split_evenly((2, 2)).iter().zip(MacroKind::ALL) {
            let values: Vec<f64> = rollup.days.iter().map(|b| b.totals.get(kind)).collect();
            // Keep a visible axis when the whole week is zero
            let y_max = (rollup.peak(|m: &Macros| m.get(kind)) * 1.1).max(1.0);

            let mut chart = ChartBuilder::on(area)
                .caption(kind.label(), ("sans-serif", 22))
                .margin(12)
                .x_label_area_size(30)
                .y_label_area_size(50)
                .build_cartesian_2d((0u32..values.len() as u32).into_segmented(), 0f64..y_max)
                .map_err(|e| e.to_string())?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) => {
                        labels.get(*i as usize).map(|l| l.to_string()).unwrap_or_default()
                    }
                    _ => String::new(),
                })
                .draw()
                .map_err(|e| e.to_string())?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(macro_color(kind).filled())
                        .margin(8)
                        .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
                )
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    encode_png(buffer, width, height)
}

// ============================================================================
// Export Tool
// ============================================================================

fn write_png(dir: &Path, name: &str, bytes: &[u8]) -> ToolResult<String> {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path.display().to_string())
}

/// Write today's breakdown donut and the weekly panel into `output_dir`
pub fn export_charts(
    db: &Database,
    ctx: &RequestContext,
    output_dir: &Path,
) -> ToolResult<ExportChartsResponse> {
    let entries = load_window(db, ctx, ctx.today)?;
    let breakdown = calorie_breakdown(&daily_totals(&entries, ctx.today));
    let rollup = weekly_rollup(&entries, ctx.today);

    std::fs::create_dir_all(output_dir)?;

    let mut files = Vec::new();
    let mut skipped = Vec::new();

    if breakdown.is_empty() {
        skipped.push("calorie breakdown: nothing logged today".to_string());
    } else {
        let png = render_breakdown_donut(&breakdown, DONUT_SIZE.0, DONUT_SIZE.1)
            .map_err(ToolError::Chart)?;
        files.push(write_png(
            output_dir,
            &format!("calorie_breakdown_{}.png", ctx.today),
            &png,
        )?);
    }

    let png = render_weekly_panel(&rollup, PANEL_SIZE.0, PANEL_SIZE.1).map_err(ToolError::Chart)?;
    files.push(write_png(output_dir, &format!("weekly_{}.png", ctx.today), &png)?);

    tracing::info!(user_id = %ctx.user_id, count = files.len(), dir = %output_dir.display(), "Exported charts");

    Ok(ExportChartsResponse { files, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::food_log::log_food;
    use crate::tools::test_support::setup;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn assert_png(path: &str) {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..8], PNG_SIGNATURE, "{} is not a PNG", path);
    }

    #[test]
    fn test_export_writes_both_charts() {
        let (db, ctx) = setup();
        log_food(&db, &ctx, "Chicken bowl", Macros::new(650.0, 45.0, 70.0, 12.0)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let result = export_charts(&db, &ctx, dir.path()).unwrap();

        assert!(result.skipped.is_empty());
        assert_eq!(result.files.len(), 2);
        assert!(result.files[0].ends_with("calorie_breakdown_2025-06-11.png"));
        assert!(result.files[1].ends_with("weekly_2025-06-11.png"));
        for file in &result.files {
            assert_png(file);
        }
    }

    #[test]
    fn test_export_skips_donut_for_empty_day() {
        let (db, ctx) = setup();
        let dir = tempfile::tempdir().unwrap();

        let result = export_charts(&db, &ctx, dir.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("weekly_2025-06-11.png"));
        assert_png(&result.files[0]);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].starts_with("calorie breakdown"));
        assert!(!dir.path().join("calorie_breakdown_2025-06-11.png").exists());
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let (db, ctx) = setup();
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("charts").join("june");

        let result = export_charts(&db, &ctx, &nested).unwrap();

        assert!(nested.join("weekly_2025-06-11.png").exists());
        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_empty_breakdown_is_not_rendered() {
        let err = render_breakdown_donut(&CalorieBreakdown::default(), 100, 100).unwrap_err();
        assert_eq!(err, "No data to chart");
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(vec![255u8; 4 * 4 * 3], 4, 4).unwrap();
        assert_eq!(&png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(encode_png(vec![0u8; 5], 4, 4).is_err());
    }

    #[test]
    fn test_series_colors() {
        assert_eq!(macro_color(MacroKind::Calories).rgb(), (255, 111, 97));
        assert_eq!(macro_color(MacroKind::Fat).rgb(), (60, 179, 113));
    }
}
