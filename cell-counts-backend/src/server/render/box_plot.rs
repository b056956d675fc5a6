#![allow(clippy::cast_precision_loss)]

use std::ops::Range;

use cell_counts_core::dashboard::{BoxPlot, BoxStats};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

const SIZE: (u32, u32) = (760, 420);

const BACKGROUND: RGBColor = RGBColor(0x05, 0x08, 0x16);
const GRID: RGBColor = RGBColor(0x1F, 0x29, 0x37);
const MUTED: RGBColor = RGBColor(0x9C, 0xA3, 0xAF);

const PALETTE: [RGBColor; 6] = [
    RGBColor(0xFF, 0x4B, 0x4B),
    RGBColor(0x11, 0x18, 0x27),
    RGBColor(0x3B, 0x82, 0xF6),
    RGBColor(0x10, 0xB9, 0x81),
    RGBColor(0xF5, 0x9E, 0x0B),
    RGBColor(0xA8, 0x55, 0xF7),
];

fn palette(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// The CSS color of the `index`th series.
pub(super) fn series_color(index: usize) -> String {
    let RGBColor(r, g, b) = palette(index);

    format!("#{r:02X}{g:02X}{b:02X}")
}

fn value_range(plot: &BoxPlot) -> Range<f64> {
    let (lo, hi) = plot.value_range();
    // a flat range still needs a visible axis
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        lo.abs().max(1.0) * 0.1
    };

    (lo - pad).max(0.0)..hi + pad
}

fn draw_box<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    stats: &BoxStats,
    x: f64,
    half_width: f64,
    color: RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (left, right) = (x - half_width, x + half_width);
    let (cap_left, cap_right) = (x - half_width / 2.0, x + half_width / 2.0);
    let outline = WHITE.stroke_width(1);

    chart.draw_series([
        Rectangle::new([(left, stats.q3), (right, stats.q1)], color.filled()),
        Rectangle::new([(left, stats.q3), (right, stats.q1)], outline),
    ])?;
    chart.draw_series([
        PathElement::new(vec![(x, stats.q3), (x, stats.upper_whisker)], outline),
        PathElement::new(vec![(x, stats.q1), (x, stats.lower_whisker)], outline),
        PathElement::new(
            vec![(cap_left, stats.upper_whisker), (cap_right, stats.upper_whisker)],
            outline,
        ),
        PathElement::new(
            vec![(cap_left, stats.lower_whisker), (cap_right, stats.lower_whisker)],
            outline,
        ),
        PathElement::new(
            vec![(left, stats.median), (right, stats.median)],
            WHITE.stroke_width(2),
        ),
    ])?;
    chart.draw_series(
        stats
            .outliers
            .iter()
            .map(|v| Circle::new((x, *v), 3, color.filled())),
    )?;

    Ok(())
}

/// Draws `plot` as an SVG document: one band per timepoint along the x axis,
/// and one box per response side by side within each band.
pub(super) fn render_svg(plot: &BoxPlot) -> anyhow::Result<String> {
    let timepoints = &plot.timepoints;
    let n_bands = timepoints.len().max(1);
    let n_series = plot.series.len().max(1) as f64;
    let slot = 0.8 / n_series;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let band_label = |x: &f64| {
        let band = x.round();
        if band < 0.0 || (x - band).abs() > 1e-6 {
            return String::new();
        }

        timepoints
            .get(band as usize)
            .map(ToString::to_string)
            .unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "B cell counts over time (PBMC)",
                ("sans-serif", 16).into_font().color(&WHITE),
            )
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(-0.5..n_bands as f64 - 0.5, value_range(plot))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .max_light_lines(0)
            .x_labels(n_bands * 2 + 1)
            .x_label_formatter(&band_label)
            .y_labels(6)
            .y_label_formatter(&|v| format!("{v:.0}"))
            .x_desc("Days from treatment start")
            .y_desc("B cell count")
            .axis_style(MUTED)
            .bold_line_style(GRID)
            .label_style(("sans-serif", 12).into_font().color(&MUTED))
            .axis_desc_style(("sans-serif", 13).into_font().color(&WHITE))
            .draw()?;

        for (i, series) in plot.series.iter().enumerate() {
            let offset = (i as f64 - (n_series - 1.0) / 2.0) * slot;

            for stats in &series.boxes {
                let Some(band) = timepoints.iter().position(|t| *t == stats.timepoint) else {
                    continue;
                };

                draw_box(
                    &mut chart,
                    stats,
                    band as f64 + offset,
                    slot * 0.4,
                    palette(i),
                )?;
            }
        }

        root.present()?;
    }

    Ok(svg)
}
