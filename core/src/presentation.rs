//! Shaping result tables for charts
//!
//! Everything here is pure data transformation: series for line charts with
//! error bars, dense grids for heatmaps, the nominal threshold to realized
//! task count mapping, and the list of charts a suite run produces. Drawing
//! is left to a [`crate::Visualizer`].

use serde::Serialize;

use crate::config::{Axis, Domain, XScale};
use crate::error::{SweepError, SweepResult};
use crate::protocol::MetricKind;
use crate::suite::{ComparisonEntry, SuiteResults, SweepResults};
use crate::sweep::{GridKey, ResultTable, SweepOutcome};

/// One point of a line chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// X position
    pub x: f64,
    /// Mean time in milliseconds
    pub mean: f64,
    /// Error bar half-height
    pub stddev: f64,
}

/// A labelled line of points, in sweep order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Legend label
    pub label: String,
    /// Points in the order they are connected
    pub points: Vec<SeriesPoint>,
}

/// `(key, mean, stddev)` triples of a one-parameter table, ascending by key
pub fn linear_series(table: &ResultTable<u32>, label: impl Into<String>) -> Series {
    Series {
        label: label.into(),
        points: table
            .iter()
            .map(|(key, agg)| SeriesPoint {
                x: f64::from(*key),
                mean: agg.mean,
                stddev: agg.stddev,
            })
            .collect(),
    }
}

/// One series per threshold, each running over the worker counts
pub fn threshold_series(
    table: &ResultTable<GridKey>,
    workers: &[u32],
    thresholds: &[u32],
) -> SweepResult<Vec<Series>> {
    thresholds
        .iter()
        .map(|&threshold| {
            let points = workers
                .iter()
                .map(|&w| {
                    let agg = table
                        .get(&GridKey::new(w, threshold))
                        .ok_or(SweepError::IncompleteSweep {
                            workers: w,
                            threshold,
                        })?;
                    Ok(SeriesPoint {
                        x: f64::from(w),
                        mean: agg.mean,
                        stddev: agg.stddev,
                    })
                })
                .collect::<SweepResult<Vec<_>>>()?;
            Ok(Series {
                label: format!("threshold={threshold}"),
                points,
            })
        })
        .collect()
}

/// Dense worker x threshold matrix of mean times
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// Worker counts, one per row
    pub rows: Vec<u32>,
    /// Thresholds, one per column
    pub columns: Vec<u32>,
    /// `cells[row][column]` mean time in milliseconds
    pub cells: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Smallest and largest cell value
    pub fn range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Fill a heatmap from a grid table; every cell must be present
pub fn heatmap(
    table: &ResultTable<GridKey>,
    workers: &[u32],
    thresholds: &[u32],
) -> SweepResult<Heatmap> {
    let cells = workers
        .iter()
        .map(|&w| {
            thresholds
                .iter()
                .map(|&t| {
                    table
                        .get(&GridKey::new(w, t))
                        .map(|agg| agg.mean)
                        .ok_or(SweepError::IncompleteSweep {
                            workers: w,
                            threshold: t,
                        })
                })
                .collect::<SweepResult<Vec<f64>>>()
        })
        .collect::<SweepResult<Vec<_>>>()?;

    Ok(Heatmap {
        rows: workers.to_vec(),
        columns: thresholds.to_vec(),
        cells,
    })
}

/// Nominal threshold and the mean number of tasks it actually produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RealizedTasks {
    /// Threshold passed to the benchmark
    pub threshold: u32,
    /// Mean created-task count
    pub tasks_mean: f64,
}

/// Threshold to realized task count, in ascending threshold order
///
/// The realized counts are not necessarily monotonic in the threshold; the
/// order stays that of the nominal sweep.
pub fn realized_tasks(table: &ResultTable<u32>) -> SweepResult<Vec<RealizedTasks>> {
    table
        .iter()
        .map(|(&threshold, agg)| {
            let tasks = agg.tasks.ok_or(SweepError::MissingTaskCounts(threshold))?;
            Ok(RealizedTasks {
                threshold,
                tasks_mean: tasks.mean,
            })
        })
        .collect()
}

/// Time against realized task count, connected in nominal threshold order
pub fn realized_task_series(
    table: &ResultTable<u32>,
    label: impl Into<String>,
) -> SweepResult<Series> {
    let mapping = realized_tasks(table)?;
    let points = mapping
        .iter()
        .zip(table.iter())
        .map(|(m, (_, agg))| SeriesPoint {
            x: m.tasks_mean,
            mean: agg.mean,
            stddev: agg.stddev,
        })
        .collect();
    Ok(Series {
        label: label.into(),
        points,
    })
}

// ============================================================================
// Chart plans
// ============================================================================

/// Line chart with error bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    /// Output file name
    pub file_name: String,
    /// Chart title
    pub title: String,
    /// X axis description
    pub x_label: String,
    /// Y axis description
    pub y_label: String,
    /// X axis scale
    pub x_scale: XScale,
    /// Lines to draw
    pub series: Vec<Series>,
}

/// Annotated heatmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapChart {
    /// Output file name
    pub file_name: String,
    /// Chart title
    pub title: String,
    /// The grid
    pub grid: Heatmap,
}

/// Bars with error bars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    /// Output file name
    pub file_name: String,
    /// Chart title
    pub title: String,
    /// Y axis description
    pub y_label: String,
    /// One bar per entry, left to right
    pub bars: Vec<ComparisonEntry>,
}

/// A chart to be rendered by a visualizer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    /// Line chart
    Line(LineChart),
    /// Heatmap
    Heatmap(HeatmapChart),
    /// Bar chart
    Bars(BarChart),
}

impl Chart {
    /// Output file name
    pub fn file_name(&self) -> &str {
        match self {
            Chart::Line(c) => &c.file_name,
            Chart::Heatmap(c) => &c.file_name,
            Chart::Bars(c) => &c.file_name,
        }
    }
}

const TIME_LABEL: &str = "Time (ms)";

fn size_label(size: Option<u32>, fallback: &str) -> String {
    match size {
        Some(n) => format!("N={n}"),
        None => fallback.to_string(),
    }
}

fn size_suffix(sweep: &SweepResults, size: Option<u32>) -> String {
    match size {
        Some(n) if sweep.runs.len() > 1 => format!("_n{n}"),
        _ => String::new(),
    }
}

fn size_title(size: Option<u32>) -> String {
    size.map(|n| format!(" (N={n})")).unwrap_or_default()
}

fn plan_sweep(sweep: &SweepResults) -> SweepResult<Vec<Chart>> {
    let spec = &sweep.spec;
    let mut charts = Vec::new();

    match &spec.domain {
        Domain::Fixed => {}
        Domain::Linear { axis, .. } => {
            let mut series = Vec::new();
            for run in &sweep.runs {
                if let SweepOutcome::Linear(table) = &run.outcome {
                    let label = size_label(run.size, &spec.strategy);
                    series.push(match spec.metric {
                        MetricKind::TimeAndTasks => realized_task_series(table, label)?,
                        MetricKind::Time => linear_series(table, label),
                    });
                }
            }

            let (file_name, title, x_label) = match spec.metric {
                MetricKind::TimeAndTasks => (
                    format!("{}_tasks_vs_time.png", spec.id),
                    format!("{} - Time vs tasks created", spec.strategy),
                    "Tasks created".to_string(),
                ),
                MetricKind::Time => (
                    format!("{}_times.png", spec.id),
                    format!("{} - Time vs {}", spec.strategy, axis.title()),
                    axis.title().to_string(),
                ),
            };
            charts.push(Chart::Line(LineChart {
                file_name,
                title,
                x_label,
                y_label: TIME_LABEL.into(),
                x_scale: spec.x_scale,
                series,
            }));
        }
        Domain::Grid {
            workers,
            thresholds,
        } => {
            for run in &sweep.runs {
                let SweepOutcome::Grid(table) = &run.outcome else {
                    continue;
                };
                let suffix = size_suffix(sweep, run.size);

                charts.push(Chart::Line(LineChart {
                    file_name: format!("{}_times{suffix}.png", spec.id),
                    title: format!(
                        "{} - Time vs {} by threshold{}",
                        spec.strategy,
                        Axis::Workers.title(),
                        size_title(run.size)
                    ),
                    x_label: Axis::Workers.title().into(),
                    y_label: TIME_LABEL.into(),
                    x_scale: spec.x_scale,
                    series: threshold_series(table, workers, thresholds)?,
                }));
                charts.push(Chart::Heatmap(HeatmapChart {
                    file_name: format!("{}_heatmap{suffix}.png", spec.id),
                    title: format!("{} - Time heatmap{}", spec.strategy, size_title(run.size)),
                    grid: heatmap(table, workers, thresholds)?,
                }));
            }
        }
    }

    Ok(charts)
}

/// Every chart a suite run produces, in configuration order, followed by
/// the final comparison when any sweep is compared
pub fn plan_charts(results: &SuiteResults) -> SweepResult<Vec<Chart>> {
    let mut charts = Vec::new();
    for sweep in &results.sweeps {
        charts.extend(plan_sweep(sweep)?);
    }

    let bars = results.comparison()?;
    if !bars.is_empty() {
        charts.push(Chart::Bars(BarChart {
            file_name: "final_comparison.png".into(),
            title: format!(
                "{} - Best configurations{}",
                results.config.name,
                size_title(results.config.comparison_size)
            ),
            y_label: TIME_LABEL.into(),
            bars,
        }));
    }

    Ok(charts)
}
