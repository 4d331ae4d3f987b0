//! sweep-bench-core: parameter sweeps over external benchmark programs
//!
//! This crate holds everything between a command line and a chart:
//!
//! - The output line protocol and sample parsing ([`protocol`])
//! - Process execution and sample collection ([`runner`])
//! - Repeated-trial aggregation ([`trial`], [`stats`])
//! - Sweep enumeration and result tables ([`sweep`])
//! - Best-configuration selection ([`select`])
//! - Suite configuration and execution ([`config`], [`suite`])
//! - Chart planning ([`presentation`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod presentation;
pub mod protocol;
pub mod runner;
pub mod select;
pub mod stats;
pub mod suite;
pub mod sweep;
pub mod template;
pub mod traits;
pub mod trial;

pub use config::{Axis, ConfigError, Domain, SuiteConfig, SweepSpec, XScale};
pub use error::*;
pub use presentation::{plan_charts, Chart, Heatmap, Series, SeriesPoint};
pub use protocol::{MetricKind, Sample};
pub use runner::{SampleCollector, ShellRunner};
pub use select::{best, Best};
pub use stats::{Aggregate, Summary};
pub use suite::{ComparisonEntry, SuiteResults, SuiteRunner, SweepResults};
pub use sweep::{GridKey, ResultTable, SweepOutcome, SweepRunner};
pub use traits::*;
pub use trial::TrialAggregator;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::runner::mock::EchoRunner;

    fn matrix_output(command: &str) -> String {
        let workers: f64 = command
            .split_whitespace()
            .nth(1)
            .and_then(|w| w.parse().ok())
            .unwrap_or(1.0);
        format!("warming up\nTiempo (ms): {}\ndone\n", 2000.0 / workers)
    }

    #[tokio::test]
    async fn test_matrix_preset_end_to_end() {
        let config = SuiteConfig::matrix().with_repeats(2);
        let runner = SuiteRunner::new(config, EchoRunner::new(matrix_output))
            .unwrap()
            .with_progress(false);
        let results = runner.run().await.unwrap();

        let comparison = results.comparison().unwrap();
        let labels: Vec<&str> = comparison.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Sequential",
                "Executor (20)",
                "ForkJoin (20, th=16)",
                "Virtual (1024)"
            ]
        );

        let charts = plan_charts(&results).unwrap();
        let names: Vec<&str> = charts.iter().map(|c| c.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "executor_times.png",
                "forkjoin_times.png",
                "forkjoin_heatmap.png",
                "virtual_times.png",
                "final_comparison.png"
            ]
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let table: ResultTable<GridKey> = [(
            GridKey::new(2, 16),
            Aggregate {
                mean: 10.0,
                stddev: 1.0,
                samples: 2,
                tasks: None,
            },
        )]
        .into_iter()
        .collect();
        let json = serde_json::to_value(SweepOutcome::Grid(table)).unwrap();

        assert_eq!(json["type"], "grid");
        assert_eq!(json["results"][0]["key"]["workers"], 2);
        assert_eq!(json["results"][0]["key"]["threshold"], 16);
        assert_eq!(json["results"][0]["mean"], 10.0);
    }
}
