//! Line charts with error bars

use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;
use sweep_bench_core::presentation::LineChart;
use sweep_bench_core::XScale;

/// Maps data x values onto the drawing axis and back for tick labels
#[derive(Debug, Clone, Copy)]
struct AxisMap(XScale);

impl AxisMap {
    fn forward(self, x: f64) -> f64 {
        match self.0 {
            XScale::Linear => x,
            XScale::Log2 => x.max(f64::MIN_POSITIVE).log2(),
            XScale::Log10 => x.max(f64::MIN_POSITIVE).log10(),
        }
    }

    fn label(self, x: f64) -> String {
        let value = match self.0 {
            XScale::Linear => x,
            XScale::Log2 => 2f64.powf(x),
            XScale::Log10 => 10f64.powf(x),
        };
        if value >= 10.0 || value.fract().abs() < 1e-9 {
            format!("{:.0}", value)
        } else {
            format!("{:.1}", value)
        }
    }
}

fn padded(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * frac;
    (lo - pad, hi + pad)
}

pub(crate) struct LinePlotter;

impl LinePlotter {
    /// Draw every series with markers and one-stddev error bars
    pub(crate) fn plot(chart: &LineChart, path: &Path) -> Result<()> {
        let map = AxisMap(chart.x_scale);
        let points: Vec<_> = chart.series.iter().flat_map(|s| &s.points).collect();
        if points.is_empty() {
            bail!("line chart '{}' has no points", chart.title);
        }

        let (x_lo, x_hi) = points
            .iter()
            .map(|p| map.forward(p.x))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        let (x_lo, x_hi) = padded(x_lo, x_hi, 0.05);
        let y_hi = points
            .iter()
            .map(|p| p.mean + p.stddev)
            .fold(0.0, f64::max);
        let y_hi = if y_hi > 0.0 { y_hi * 1.1 } else { 1.0 };

        let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 36))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(&|x| map.label(*x))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        for (idx, series) in chart.series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let coords: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|p| (map.forward(p.x), p.mean))
                .collect();

            ctx.draw_series(LineSeries::new(coords.clone(), color.stroke_width(2)))?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });

            ctx.draw_series(
                coords
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
            )?;

            ctx.draw_series(series.points.iter().map(|p| {
                ErrorBar::new_vertical(
                    map.forward(p.x),
                    p.mean - p.stddev,
                    p.mean,
                    p.mean + p.stddev,
                    color.stroke_width(1),
                    8,
                )
            }))?;
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}
