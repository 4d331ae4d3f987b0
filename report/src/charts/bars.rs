//! Bar comparison of the best configuration per strategy

use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;
use sweep_bench_core::presentation::BarChart;

pub(crate) struct BarPlotter;

impl BarPlotter {
    pub(crate) fn plot(chart: &BarChart, path: &Path) -> Result<()> {
        if chart.bars.is_empty() {
            bail!("bar chart '{}' has no bars", chart.title);
        }
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        let y_hi = chart
            .bars
            .iter()
            .map(|b| b.mean + b.stddev)
            .fold(0.0, f64::max);
        let y_hi = if y_hi > 0.0 { y_hi * 1.2 } else { 1.0 };

        let root = BitMapBackend::new(path, (1400, 900)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 36))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0..labels.len() as i32).into_segmented(), 0f64..y_hi)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .y_desc(chart.y_label.as_str())
            .x_labels(labels.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => usize::try_from(*i)
                    .ok()
                    .and_then(|i| labels.get(i))
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            let i = i as i32;
            let color = Palette99::pick(i as usize).mix(0.8);
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), bar.mean),
                ],
                color.filled(),
            );
            rect.set_margin(0, 0, 20, 20);
            rect
        }))?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            ErrorBar::new_vertical(
                SegmentValue::CenterOf(i as i32),
                bar.mean - bar.stddev,
                bar.mean,
                bar.mean + bar.stddev,
                BLACK.stroke_width(2),
                16,
            )
        }))?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                format!("{:.1} ms", bar.mean),
                (SegmentValue::CenterOf(i as i32), bar.mean + bar.stddev),
                ("sans-serif", 16),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}
