//! Chart rendering with plotters

mod bars;
mod heatmap;
mod line;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sweep_bench_core::{Chart, Visualizer};

use bars::BarPlotter;
use heatmap::HeatmapPlotter;
use line::LinePlotter;

/// Renders planned charts to PNG files
#[derive(Debug, Default, Clone, Copy)]
pub struct PlotVisualizer;

impl PlotVisualizer {
    /// Create a visualizer
    pub fn new() -> Self {
        Self
    }
}

impl Visualizer for PlotVisualizer {
    type Error = anyhow::Error;

    fn render(&self, chart: &Chart, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(chart.file_name());
        match chart {
            Chart::Line(c) => LinePlotter::plot(c, &path),
            Chart::Heatmap(c) => HeatmapPlotter::plot(c, &path),
            Chart::Bars(c) => BarPlotter::plot(c, &path),
        }
        .with_context(|| format!("Failed to render {}", path.display()))?;

        tracing::info!(path = %path.display(), "chart written");
        Ok(path)
    }
}
