//! Whole-suite execution
//!
//! Runs every sweep of a [`SuiteConfig`] in configuration order, each at every
//! one of its problem sizes, strictly one after the other.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Axis, Domain, SuiteConfig, SweepSpec};
use crate::error::{SweepError, SweepResult};
use crate::select::best;
use crate::stats::Aggregate;
use crate::sweep::{SweepOutcome, SweepRunner};
use crate::traits::BenchmarkRunner;

/// Outcome of one sweep at one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizedOutcome {
    /// Problem size, `None` when the benchmark takes none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Aggregated results
    pub outcome: SweepOutcome,
}

/// All results of one sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepResults {
    /// The sweep that produced them
    pub spec: SweepSpec,
    /// One entry per problem size, ascending
    pub runs: Vec<SizedOutcome>,
}

impl SweepResults {
    /// Outcome at `size`
    pub fn at(&self, size: Option<u32>) -> Option<&SweepOutcome> {
        self.runs
            .iter()
            .find(|r| r.size == size)
            .map(|r| &r.outcome)
    }
}

/// One bar of the final comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    /// Strategy name with its winning configuration, e.g. `ForkJoin (8, th=32)`
    pub label: String,
    /// Strategy name
    pub strategy: String,
    /// Mean time in milliseconds
    pub mean: f64,
    /// Standard deviation in milliseconds
    pub stddev: f64,
}

impl ComparisonEntry {
    fn new(label: String, strategy: &str, agg: &Aggregate) -> Self {
        Self {
            label,
            strategy: strategy.to_string(),
            mean: agg.mean,
            stddev: agg.stddev,
        }
    }
}

/// Results of a complete suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Configuration that was run
    pub config: SuiteConfig,
    /// When the first trial started
    pub started_at: DateTime<Utc>,
    /// When the last trial finished
    pub finished_at: DateTime<Utc>,
    /// Per-sweep results in configuration order
    pub sweeps: Vec<SweepResults>,
}

impl SuiteResults {
    /// Results of the sweep with `id`
    pub fn sweep(&self, id: &str) -> Option<&SweepResults> {
        self.sweeps.iter().find(|s| s.spec.id == id)
    }

    /// Best configuration of every compared sweep, in configuration order
    ///
    /// Sweeps with problem sizes are compared at the suite's
    /// `comparison_size`; sweeps without sizes use their only run.
    pub fn comparison(&self) -> SweepResult<Vec<ComparisonEntry>> {
        let mut entries = Vec::new();

        for sweep in self.sweeps.iter().filter(|s| s.spec.compare) {
            let size = if sweep.spec.sizes.is_empty() {
                None
            } else {
                self.config.comparison_size
            };
            let outcome = sweep.at(size).ok_or_else(|| SweepError::MissingRun {
                sweep: sweep.spec.id.clone(),
                size,
            })?;
            let strategy = sweep.spec.strategy.as_str();

            let entry = match outcome {
                SweepOutcome::Fixed(agg) => {
                    ComparisonEntry::new(strategy.to_string(), strategy, agg)
                }
                SweepOutcome::Linear(table) => {
                    let b = best(table)?;
                    let label = match &sweep.spec.domain {
                        Domain::Linear {
                            axis: Axis::Threshold,
                            ..
                        } => format!("{strategy} (th={})", b.key),
                        _ => format!("{strategy} ({})", b.key),
                    };
                    ComparisonEntry::new(label, strategy, &b.aggregate)
                }
                SweepOutcome::Grid(table) => {
                    let b = best(table)?;
                    ComparisonEntry::new(format!("{strategy} {}", b.key), strategy, &b.aggregate)
                }
            };
            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Runs every sweep of a suite
pub struct SuiteRunner<R> {
    config: SuiteConfig,
    sweeps: SweepRunner<R>,
}

impl<R: BenchmarkRunner> SuiteRunner<R> {
    /// Validate `config` and prepare a runner
    pub fn new(config: SuiteConfig, runner: R) -> SweepResult<Self> {
        config.validate()?;
        let sweeps = SweepRunner::new(runner, config.repeats)?;
        Ok(Self { config, sweeps })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.sweeps = self.sweeps.with_progress(show);
        self
    }

    /// The configuration being run
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Access the underlying runner
    pub fn runner(&self) -> &R {
        self.sweeps.runner()
    }

    /// Run every sweep; the first failure aborts the suite
    pub async fn run(&self) -> SweepResult<SuiteResults> {
        let started_at = Utc::now();
        tracing::info!(
            suite = %self.config.name,
            sweeps = self.config.sweeps.len(),
            repeats = self.config.repeats,
            "starting suite"
        );

        let mut sweeps = Vec::with_capacity(self.config.sweeps.len());
        for spec in &self.config.sweeps {
            let spec = SweepSpec {
                domain: spec.domain.normalized(),
                ..spec.clone()
            };
            let mut runs = Vec::new();
            for size in spec.size_points() {
                let outcome = self.sweeps.run(&spec, size).await?;
                runs.push(SizedOutcome { size, outcome });
            }
            sweeps.push(SweepResults { spec, runs });
        }

        let finished_at = Utc::now();
        tracing::info!(
            suite = %self.config.name,
            elapsed_secs = (finished_at - started_at).num_seconds(),
            "suite complete"
        );

        Ok(SuiteResults {
            config: self.config.clone(),
            started_at,
            finished_at,
            sweeps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::XScale;
    use crate::protocol::MetricKind;
    use crate::runner::mock::EchoRunner;
    use std::path::PathBuf;

    /// Time falls with workers and rises with threshold; every argument after
    /// the script name is a parameter
    fn fake_bench(command: &str) -> String {
        let mut parts = command.split_whitespace();
        let script = parts.next().unwrap_or_default();
        let args: Vec<f64> = parts.filter_map(|a| a.parse().ok()).collect();
        let time = match script {
            "./seq" => 1000.0,
            "./exec" => 1000.0 / args[0] + 5.0,
            "./fj" => 800.0 / args[0] + args[1],
            "./virt" => 300.0 + args[1],
            _ => 0.0,
        };
        let mut out = format!("Tiempo (ms): {time}\n");
        if script == "./virt" {
            out.push_str(&format!("Virtual threads realmente creados: {}\n", 10 * args[1] as u64));
        }
        out
    }

    fn config() -> SuiteConfig {
        SuiteConfig {
            name: "toy".into(),
            repeats: 2,
            output_dir: PathBuf::from("out"),
            trial_timeout_secs: None,
            comparison_size: Some(14),
            sweeps: vec![
                SweepSpec {
                    id: "seq".into(),
                    strategy: "Sequential".into(),
                    command: "./seq {size}".into(),
                    domain: Domain::Fixed,
                    metric: MetricKind::Time,
                    sizes: vec![14],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "exec".into(),
                    strategy: "Executor".into(),
                    command: "./exec {workers} {size}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Workers,
                        values: vec![4, 1, 2],
                    },
                    metric: MetricKind::Time,
                    sizes: vec![14, 12],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "fj".into(),
                    strategy: "ForkJoin".into(),
                    command: "./fj {workers} {threshold}".into(),
                    domain: Domain::Grid {
                        workers: vec![1, 2],
                        thresholds: vec![16, 32],
                    },
                    metric: MetricKind::Time,
                    sizes: vec![],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "virt".into(),
                    strategy: "Virtual".into(),
                    command: "./virt {size} {threshold}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Threshold,
                        values: vec![1, 2, 3],
                    },
                    metric: MetricKind::TimeAndTasks,
                    sizes: vec![14],
                    x_scale: XScale::Log10,
                    compare: true,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_suite_runs_in_config_order() {
        let runner = SuiteRunner::new(config(), EchoRunner::new(fake_bench))
            .unwrap()
            .with_progress(false);
        let results = runner.run().await.unwrap();

        let ids: Vec<&str> = results.sweeps.iter().map(|s| s.spec.id.as_str()).collect();
        assert_eq!(ids, vec!["seq", "exec", "fj", "virt"]);

        let exec = results.sweep("exec").unwrap();
        let sizes: Vec<Option<u32>> = exec.runs.iter().map(|r| r.size).collect();
        assert_eq!(sizes, vec![Some(12), Some(14)]);

        // 1 + 2*3 + 4 + 3 points, 2 trials each
        assert_eq!(runner.runner().commands().len(), 2 * (1 + 6 + 4 + 3));
        assert_eq!(runner.runner().commands()[0], "./seq 14");
        assert!(results.finished_at >= results.started_at);
    }

    #[tokio::test]
    async fn test_comparison_labels_best_points() {
        let runner = SuiteRunner::new(config(), EchoRunner::new(fake_bench))
            .unwrap()
            .with_progress(false);
        let results = runner.run().await.unwrap();
        let entries = results.comparison().unwrap();

        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Sequential",
                "Executor (4)",
                "ForkJoin (2, th=16)",
                "Virtual (th=1)"
            ]
        );
        assert_eq!(entries[1].mean, 255.0);
        assert_eq!(entries[2].mean, 416.0);
        assert_eq!(entries[0].stddev, 0.0);
    }

    #[tokio::test]
    async fn test_comparison_at_unswept_size_names_the_sweep() {
        let runner = SuiteRunner::new(config(), EchoRunner::new(fake_bench))
            .unwrap()
            .with_progress(false);
        let mut results = runner.run().await.unwrap();
        results.config.comparison_size = Some(12);

        match results.comparison() {
            Err(SweepError::MissingRun { sweep, size }) => {
                assert_eq!(sweep, "seq");
                assert_eq!(size, Some(12));
            }
            other => panic!("Expected MissingRun, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let mut cfg = config();
        cfg.repeats = 1;
        assert!(SuiteRunner::new(cfg, EchoRunner::new(fake_bench)).is_err());
    }

    #[tokio::test]
    async fn test_suite_results_serialize() {
        let runner = SuiteRunner::new(config(), EchoRunner::new(fake_bench))
            .unwrap()
            .with_progress(false);
        let results = runner.run().await.unwrap();
        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json["config"]["name"], "toy");
        assert_eq!(json["sweeps"][2]["runs"][0]["outcome"]["type"], "grid");
        assert_eq!(
            json["sweeps"][2]["runs"][0]["outcome"]["results"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert_eq!(
            json["sweeps"][3]["runs"][0]["outcome"]["results"][0]["tasks"]["mean"],
            10.0
        );
    }
}
