//! Sweep enumeration
//!
//! The [`SweepRunner`] visits every configuration point of a sweep in a
//! deterministic order (ascending worker count, then ascending threshold),
//! runs the repeated trials of each point to completion before moving on,
//! and assembles the aggregates into a [`ResultTable`].
//!
//! Points never run concurrently: overlapping benchmark processes would
//! contend for the cores whose scheduling is being measured.
//!
//! # Example
//!
//! ```ignore
//! use sweep_bench_core::{ShellRunner, SuiteConfig, SweepRunner};
//!
//! let config = SuiteConfig::matrix();
//! let runner = SweepRunner::new(ShellRunner::new(), config.repeats)?;
//! let outcome = runner.run(&config.sweeps[1], None).await?;
//! ```

mod key;
mod table;


pub use key::{grid_points, GridKey, SweepKey};
pub use table::ResultTable;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{Axis, Domain, SweepSpec};
use crate::error::SweepResult;
use crate::stats::Aggregate;
use crate::template::{render, Point};
use crate::traits::BenchmarkRunner;
use crate::trial::TrialAggregator;

/// Result of running one sweep at one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "results", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Single-point baseline
    Fixed(Aggregate),
    /// One-parameter sweep
    Linear(ResultTable<u32>),
    /// Workers x threshold sweep
    Grid(ResultTable<GridKey>),
}

impl SweepOutcome {
    /// Number of configuration points
    pub fn len(&self) -> usize {
        match self {
            SweepOutcome::Fixed(_) => 1,
            SweepOutcome::Linear(table) => table.len(),
            SweepOutcome::Grid(table) => table.len(),
        }
    }

    /// Whether no point was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drives the trial aggregator over every point of a sweep
pub struct SweepRunner<R> {
    trials: TrialAggregator<R>,
    show_progress: bool,
}

impl<R: BenchmarkRunner> SweepRunner<R> {
    /// Create a sweep runner; fails when `repeats` is below 2
    pub fn new(runner: R, repeats: usize) -> SweepResult<Self> {
        Ok(Self {
            trials: TrialAggregator::new(runner, repeats)?,
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Access the underlying runner
    pub fn runner(&self) -> &R {
        self.trials.runner()
    }

    fn progress_bar(&self, spec: &SweepSpec, points: usize, size: Option<u32>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new((points * self.trials.repeats()) as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_prefix(match size {
            Some(n) => format!("{} N={n}", spec.strategy),
            None => spec.strategy.clone(),
        });
        pb
    }

    async fn run_point(
        &self,
        spec: &SweepSpec,
        point: Point,
        pb: &ProgressBar,
    ) -> SweepResult<Aggregate> {
        let command = render(&spec.command, &point)?;
        pb.set_message(point.to_string());

        let agg = self.trials.aggregate(&command, spec.metric, pb).await?;

        match agg.tasks {
            Some(tasks) => tracing::info!(
                strategy = %spec.strategy,
                %point,
                mean_ms = agg.mean,
                stddev_ms = agg.stddev,
                tasks_mean = tasks.mean,
                "point complete"
            ),
            None => tracing::info!(
                strategy = %spec.strategy,
                %point,
                mean_ms = agg.mean,
                stddev_ms = agg.stddev,
                "point complete"
            ),
        }
        Ok(agg)
    }

    /// Run the single point of a fixed sweep
    pub async fn run_fixed(&self, spec: &SweepSpec, size: Option<u32>) -> SweepResult<Aggregate> {
        let pb = self.progress_bar(spec, 1, size);
        let point = Point {
            size,
            ..Default::default()
        };
        let agg = self.run_point(spec, point, &pb).await?;
        pb.finish_with_message("done");
        Ok(agg)
    }

    /// Sweep one parameter over `values`, visited in ascending order
    pub async fn run_linear(
        &self,
        spec: &SweepSpec,
        axis: Axis,
        values: &[u32],
        size: Option<u32>,
    ) -> SweepResult<ResultTable<u32>> {
        let values = ascending(values);
        let pb = self.progress_bar(spec, values.len(), size);
        let mut table = ResultTable::new();
        for value in values {
            let point = match axis {
                Axis::Workers => Point {
                    workers: Some(value),
                    size,
                    ..Default::default()
                },
                Axis::Threshold => Point {
                    threshold: Some(value),
                    size,
                    ..Default::default()
                },
            };
            let agg = self.run_point(spec, point, &pb).await?;
            table.insert(value, agg)?;
        }
        pb.finish_with_message("done");
        Ok(table)
    }

    /// Sweep the full workers x thresholds cross product
    pub async fn run_grid(
        &self,
        spec: &SweepSpec,
        workers: &[u32],
        thresholds: &[u32],
        size: Option<u32>,
    ) -> SweepResult<ResultTable<GridKey>> {
        let workers = ascending(workers);
        let thresholds = ascending(thresholds);

        let points = grid_points(&workers, &thresholds);
        let pb = self.progress_bar(spec, points.len(), size);
        let mut table = ResultTable::new();
        for key in points {
            let point = Point {
                workers: Some(key.workers),
                threshold: Some(key.threshold),
                size,
            };
            let agg = self.run_point(spec, point, &pb).await?;
            table.insert(key, agg)?;
        }
        pb.finish_with_message("done");
        Ok(table)
    }

    /// Run `spec` at one problem size according to its domain
    pub async fn run(&self, spec: &SweepSpec, size: Option<u32>) -> SweepResult<SweepOutcome> {
        tracing::info!(strategy = %spec.strategy, sweep = %spec.id, ?size, "starting sweep");
        match &spec.domain {
            Domain::Fixed => Ok(SweepOutcome::Fixed(self.run_fixed(spec, size).await?)),
            Domain::Linear { axis, values } => Ok(SweepOutcome::Linear(
                self.run_linear(spec, *axis, values, size).await?,
            )),
            Domain::Grid {
                workers,
                thresholds,
            } => Ok(SweepOutcome::Grid(
                self.run_grid(spec, workers, thresholds, size).await?,
            )),
        }
    }
}

/// Sorted, de-duplicated copy
fn ascending(values: &[u32]) -> Vec<u32> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}
