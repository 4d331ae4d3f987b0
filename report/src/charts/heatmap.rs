//! Annotated heatmaps of workers x threshold grids

use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;
use sweep_bench_core::presentation::HeatmapChart;

/// Cell colour for `value` within `[lo, hi]`, blue for fast through red for slow
fn cell_color(value: f64, lo: f64, hi: f64) -> HSLColor {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
    HSLColor(0.66 * (1.0 - t.clamp(0.0, 1.0)), 0.75, 0.55)
}

fn axis_label(values: &[u32], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| values.get(i))
            .map(|v| v.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

pub(crate) struct HeatmapPlotter;

impl HeatmapPlotter {
    /// Draw one cell per grid entry, annotated with the mean in whole
    /// milliseconds
    pub(crate) fn plot(chart: &HeatmapChart, path: &Path) -> Result<()> {
        let grid = &chart.grid;
        let Some((lo, hi)) = grid.range() else {
            bail!("heatmap '{}' has no cells", chart.title);
        };
        let cols = grid.columns.len() as i32;
        let rows = grid.rows.len() as i32;

        let root = BitMapBackend::new(path, (1200, 900)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 36))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_desc("Threshold")
            .y_desc("Threads")
            .x_labels(grid.columns.len())
            .y_labels(grid.rows.len())
            .x_label_formatter(&|v| axis_label(&grid.columns, v))
            .y_label_formatter(&|v| axis_label(&grid.rows, v))
            .draw()?;

        let cells: Vec<(i32, i32, f64)> = grid
            .cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(c, &mean)| (c as i32, r as i32, mean))
            })
            .collect();

        ctx.draw_series(cells.iter().map(|&(c, r, mean)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                    (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
                ],
                cell_color(mean, lo, hi).filled(),
            )
        }))?;

        ctx.draw_series(cells.iter().map(|&(c, r, mean)| {
            Text::new(
                format!("{:.0}", mean),
                (SegmentValue::CenterOf(c), SegmentValue::CenterOf(r)),
                ("sans-serif", 16),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_color_spans_blue_to_red() {
        assert_eq!(cell_color(10.0, 10.0, 20.0).0, 0.66);
        assert_eq!(cell_color(20.0, 10.0, 20.0).0, 0.0);
        assert_eq!(cell_color(5.0, 5.0, 5.0).0, 0.33);
    }

    #[test]
    fn test_axis_label_centers_only() {
        let values = [16, 32];
        assert_eq!(axis_label(&values, &SegmentValue::CenterOf(1)), "32");
        assert_eq!(axis_label(&values, &SegmentValue::Exact(1)), "");
        assert_eq!(axis_label(&values, &SegmentValue::CenterOf(5)), "");
    }
}
