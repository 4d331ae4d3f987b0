//! Suite configuration types
//!
//! A [`SuiteConfig`] replaces the hand-edited constants of an experiment
//! script: it names every sweep, its command template, its parameter domain
//! and the repeat count shared by all of them. Configurations are immutable
//! once validated and are passed explicitly into the sweep engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::MetricKind;
use crate::stats::MIN_SAMPLES;
use crate::template::placeholders;

/// Which parameter a one-dimensional sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Worker / thread count
    Workers,
    /// Split threshold
    Threshold,
}

impl Axis {
    /// Placeholder the axis value is substituted into
    pub fn placeholder(&self) -> &'static str {
        match self {
            Axis::Workers => "workers",
            Axis::Threshold => "threshold",
        }
    }

    /// Axis title for charts
    pub fn title(&self) -> &'static str {
        match self {
            Axis::Workers => "Threads",
            Axis::Threshold => "Threshold",
        }
    }
}

/// X-axis scale for line charts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XScale {
    /// Plain linear axis
    #[default]
    Linear,
    /// Logarithmic, base 2
    Log2,
    /// Logarithmic, base 10
    Log10,
}

/// Parameter space of a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    /// A single configuration point with no tunable parameter
    Fixed,
    /// One parameter varies
    Linear {
        /// The varied parameter
        axis: Axis,
        /// Values to visit
        values: Vec<u32>,
    },
    /// Full cross product of worker counts and thresholds
    Grid {
        /// Worker counts (rows)
        workers: Vec<u32>,
        /// Thresholds (columns)
        thresholds: Vec<u32>,
    },
}

impl Domain {
    /// Copy with every value list sorted ascending and de-duplicated
    pub fn normalized(&self) -> Self {
        fn norm(values: &[u32]) -> Vec<u32> {
            let mut v = values.to_vec();
            v.sort_unstable();
            v.dedup();
            v
        }

        match self {
            Domain::Fixed => Domain::Fixed,
            Domain::Linear { axis, values } => Domain::Linear {
                axis: *axis,
                values: norm(values),
            },
            Domain::Grid {
                workers,
                thresholds,
            } => Domain::Grid {
                workers: norm(workers),
                thresholds: norm(thresholds),
            },
        }
    }

    /// Number of configuration points
    pub fn len(&self) -> usize {
        match self {
            Domain::Fixed => 1,
            Domain::Linear { values, .. } => values.len(),
            Domain::Grid {
                workers,
                thresholds,
            } => workers.len() * thresholds.len(),
        }
    }

    /// Whether the domain has no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn required_placeholders(&self) -> Vec<&'static str> {
        match self {
            Domain::Fixed => vec![],
            Domain::Linear { axis, .. } => vec![axis.placeholder()],
            Domain::Grid { .. } => vec!["workers", "threshold"],
        }
    }
}

/// One strategy sweep: what to run and over which parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSpec {
    /// Identifier, used for output file names
    pub id: String,

    /// Strategy display name
    pub strategy: String,

    /// Command template, see [`crate::template`]
    pub command: String,

    /// Parameter space
    pub domain: Domain,

    /// Metrics the benchmark reports
    #[serde(default)]
    pub metric: MetricKind,

    /// Problem sizes; empty means the benchmark takes no size argument
    #[serde(default)]
    pub sizes: Vec<u32>,

    /// X-axis scale for this sweep's line chart
    #[serde(default)]
    pub x_scale: XScale,

    /// Include the best configuration in the final comparison
    #[serde(default)]
    pub compare: bool,
}

impl SweepSpec {
    /// Problem sizes to run, `[None]` when the benchmark takes no size
    pub fn size_points(&self) -> Vec<Option<u32>> {
        if self.sizes.is_empty() {
            vec![None]
        } else {
            let mut sizes = self.sizes.clone();
            sizes.sort_unstable();
            sizes.dedup();
            sizes.into_iter().map(Some).collect()
        }
    }

    /// Validate this sweep in isolation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyField("sweep id".into()));
        }
        if self.strategy.trim().is_empty() {
            return Err(ConfigError::EmptyField(format!("strategy of '{}'", self.id)));
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::EmptyField(format!("command of '{}'", self.id)));
        }

        let values: Vec<u32> = match &self.domain {
            Domain::Fixed => vec![],
            Domain::Linear { values, .. } => values.clone(),
            Domain::Grid {
                workers,
                thresholds,
            } => workers.iter().chain(thresholds).copied().collect(),
        };
        if self.domain.is_empty() {
            return Err(ConfigError::EmptyDomain(self.id.clone()));
        }
        if values.iter().chain(&self.sizes).any(|&v| v == 0) {
            return Err(ConfigError::InvalidDomain(format!(
                "'{}' has a zero parameter value",
                self.id
            )));
        }
        if self.metric == MetricKind::TimeAndTasks
            && !matches!(self.domain, Domain::Linear { .. })
        {
            return Err(ConfigError::InvalidDomain(format!(
                "'{}' reports task counts and must be a one-dimensional sweep",
                self.id
            )));
        }

        let used = placeholders(&self.command);
        let mut provided: Vec<&str> = self.domain.required_placeholders();
        if !self.sizes.is_empty() {
            provided.push("size");
        }
        for name in &provided {
            if !used.contains(name) {
                return Err(ConfigError::InvalidTemplate(format!(
                    "'{}' never uses {{{name}}}",
                    self.id
                )));
            }
        }
        for name in &used {
            if !provided.contains(name) {
                return Err(ConfigError::InvalidTemplate(format!(
                    "'{}' uses {{{name}}} but its sweep does not provide it",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

/// Complete benchmark suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Suite name (e.g. "nqueens")
    pub name: String,

    /// Trials per configuration point
    pub repeats: usize,

    /// Directory receiving charts and exports
    pub output_dir: PathBuf,

    /// Kill trials running longer than this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_timeout_secs: Option<u64>,

    /// Problem size at which strategies are compared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_size: Option<u32>,

    /// Sweeps, run in order
    pub sweeps: Vec<SweepSpec>,
}

impl SuiteConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))
    }

    /// Built-in preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "nqueens" => Some(Self::nqueens()),
            "matrix" => Some(Self::matrix()),
            _ => None,
        }
    }

    /// N-Queens suite: three problem sizes, a fork/join heatmap and a
    /// virtual-thread threshold sweep reporting created-task counts
    pub fn nqueens() -> Self {
        let threads = vec![1, 2, 4, 8, 12, 16, 20];
        let sizes = vec![12, 13, 14];

        Self {
            name: "nqueens".into(),
            repeats: 10,
            output_dir: PathBuf::from("plots_nqueens"),
            trial_timeout_secs: None,
            comparison_size: Some(14),
            sweeps: vec![
                SweepSpec {
                    id: "executor".into(),
                    strategy: "Executor".into(),
                    command: "./scripts/run_nqueens_executor.sh {workers} {size}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Workers,
                        values: threads.clone(),
                    },
                    metric: MetricKind::Time,
                    sizes: sizes.clone(),
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "forkjoin".into(),
                    strategy: "ForkJoin".into(),
                    command: "./scripts/run_nqueens_forkjoin.sh {workers} {size}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Workers,
                        values: threads.clone(),
                    },
                    metric: MetricKind::Time,
                    sizes: sizes.clone(),
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "virtual".into(),
                    strategy: "Virtual".into(),
                    command: "./scripts/run_nqueens_virtual.sh {size} {threshold}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Threshold,
                        values: (1..=8).collect(),
                    },
                    metric: MetricKind::TimeAndTasks,
                    sizes,
                    x_scale: XScale::Log10,
                    compare: true,
                },
                SweepSpec {
                    id: "forkjoin_grid".into(),
                    strategy: "ForkJoin".into(),
                    command: "./scripts/run_nqueens_forkjoin.sh {workers} {size} {threshold}"
                        .into(),
                    domain: Domain::Grid {
                        workers: threads,
                        thresholds: vec![1, 2, 4, 8, 12],
                    },
                    metric: MetricKind::Time,
                    sizes: vec![14],
                    x_scale: XScale::Linear,
                    compare: false,
                },
                SweepSpec {
                    id: "sequential".into(),
                    strategy: "Sequential".into(),
                    command: "./scripts/run_nqueens_sequential.sh {size}".into(),
                    domain: Domain::Fixed,
                    metric: MetricKind::Time,
                    sizes: vec![14],
                    x_scale: XScale::Linear,
                    compare: true,
                },
            ],
        }
    }

    /// Matrix multiplication suite: fixed problem size, fork/join swept over
    /// threads x thresholds, virtual threads swept on a log2 axis
    pub fn matrix() -> Self {
        let threads = vec![1, 2, 4, 8, 12, 16, 20];

        Self {
            name: "matrix".into(),
            repeats: 50,
            output_dir: PathBuf::from("plots"),
            trial_timeout_secs: None,
            comparison_size: None,
            sweeps: vec![
                SweepSpec {
                    id: "sequential".into(),
                    strategy: "Sequential".into(),
                    command: "./scripts/run_matrix_sequential.sh".into(),
                    domain: Domain::Fixed,
                    metric: MetricKind::Time,
                    sizes: vec![],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "executor".into(),
                    strategy: "Executor".into(),
                    command: "./scripts/run_matrix_executor.sh {workers}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Workers,
                        values: threads.clone(),
                    },
                    metric: MetricKind::Time,
                    sizes: vec![],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "forkjoin".into(),
                    strategy: "ForkJoin".into(),
                    command: "./scripts/run_matrix_forkjoin.sh {workers} {threshold}".into(),
                    domain: Domain::Grid {
                        workers: threads,
                        thresholds: vec![16, 32, 64, 128],
                    },
                    metric: MetricKind::Time,
                    sizes: vec![],
                    x_scale: XScale::Linear,
                    compare: true,
                },
                SweepSpec {
                    id: "virtual".into(),
                    strategy: "Virtual".into(),
                    command: "./scripts/run_matrix_virtual.sh {workers}".into(),
                    domain: Domain::Linear {
                        axis: Axis::Workers,
                        values: vec![1, 2, 4, 8, 16, 32, 64, 256, 512, 1024],
                    },
                    metric: MetricKind::Time,
                    sizes: vec![],
                    x_scale: XScale::Log2,
                    compare: true,
                },
            ],
        }
    }

    /// Override the repeat count
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Override the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Override the per-trial timeout
    pub fn with_trial_timeout(mut self, secs: Option<u64>) -> Self {
        self.trial_timeout_secs = secs;
        self
    }

    /// Per-trial timeout as a [`Duration`]
    pub fn trial_timeout(&self) -> Option<Duration> {
        self.trial_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeats < MIN_SAMPLES {
            return Err(ConfigError::InvalidRepeats(self.repeats));
        }
        if self.sweeps.is_empty() {
            return Err(ConfigError::EmptyField("sweeps".into()));
        }
        if self.trial_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidTimeout);
        }

        let mut ids = HashSet::new();
        for sweep in &self.sweeps {
            sweep.validate()?;
            if !ids.insert(sweep.id.as_str()) {
                return Err(ConfigError::DuplicateSweep(sweep.id.clone()));
            }
            if sweep.compare && !sweep.sizes.is_empty() {
                match self.comparison_size {
                    Some(size) if sweep.sizes.contains(&size) => {}
                    Some(size) => {
                        return Err(ConfigError::InvalidComparison(format!(
                            "'{}' is compared at size {size} but never runs it",
                            sweep.id
                        )))
                    }
                    None => {
                        return Err(ConfigError::InvalidComparison(format!(
                            "'{}' has problem sizes but no comparison_size is set",
                            sweep.id
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repeat count too small for a sample standard deviation
    #[error("Invalid repeat count {0}: at least 2 trials per point are required")]
    InvalidRepeats(usize),

    /// Zero timeout
    #[error("Invalid trial timeout: must be at least 1 second")]
    InvalidTimeout,

    /// A required field is empty
    #[error("Empty {0}")]
    EmptyField(String),

    /// A sweep has no configuration points
    #[error("Sweep '{0}' has an empty domain")]
    EmptyDomain(String),

    /// Parameter values are unusable
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Command template does not match the sweep
    #[error("Invalid command template: {0}")]
    InvalidTemplate(String),

    /// Two sweeps share an id
    #[error("Duplicate sweep id '{0}'")]
    DuplicateSweep(String),

    /// Comparison settings are inconsistent
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    /// The configuration file could not be read or parsed
    #[error("Cannot load configuration: {0}")]
    Read(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_presets_are_valid() {
        SuiteConfig::nqueens().validate().unwrap();
        SuiteConfig::matrix().validate().unwrap();
        assert!(SuiteConfig::preset("nqueens").is_some());
        assert!(SuiteConfig::preset("fft").is_none());
    }

    #[test]
    fn test_single_repeat_rejected() {
        let config = SuiteConfig::matrix().with_repeats(1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRepeats(1))
        ));
    }

    #[test]
    fn test_domain_normalized() {
        let domain = Domain::Grid {
            workers: vec![8, 1, 4, 1],
            thresholds: vec![32, 16],
        };
        assert_eq!(
            domain.normalized(),
            Domain::Grid {
                workers: vec![1, 4, 8],
                thresholds: vec![16, 32],
            }
        );
        assert_eq!(domain.normalized().len(), 6);
    }

    #[test]
    fn test_template_must_use_axis() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[1].command = "./scripts/run_matrix_executor.sh".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_template_with_shell_braces_is_valid() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[1].command =
            "${BENCH_HOME}/run_executor.sh {workers} | awk '{print $0}'".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_template_cannot_use_missing_size() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[0].command = "./scripts/run_matrix_sequential.sh {size}".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_empty_domain_rejected() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[2].domain = Domain::Grid {
            workers: vec![1, 2],
            thresholds: vec![],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDomain(_))
        ));
    }

    #[test]
    fn test_zero_value_rejected() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[1].domain = Domain::Linear {
            axis: Axis::Workers,
            values: vec![0, 1],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_duplicate_sweep_rejected() {
        let mut config = SuiteConfig::matrix();
        let dup = config.sweeps[1].clone();
        config.sweeps.push(dup);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSweep(id)) if id == "executor"
        ));
    }

    #[test]
    fn test_comparison_size_must_be_swept() {
        let mut config = SuiteConfig::nqueens();
        config.comparison_size = Some(15);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidComparison(_))
        ));
    }

    #[test]
    fn test_tasks_metric_requires_linear_domain() {
        let mut config = SuiteConfig::matrix();
        config.sweeps[2].metric = MetricKind::TimeAndTasks;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_size_points() {
        let config = SuiteConfig::nqueens();
        assert_eq!(
            config.sweeps[0].size_points(),
            vec![Some(12), Some(13), Some(14)]
        );
        let matrix = SuiteConfig::matrix();
        assert_eq!(matrix.sweeps[0].size_points(), vec![None]);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let config = SuiteConfig::nqueens().with_trial_timeout(Some(30));
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SuiteConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded.repeats, 10);
        assert_eq!(loaded.sweeps.len(), 5);
        assert_eq!(loaded.trial_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(loaded.sweeps[3].domain, config.sweeps[3].domain);
    }

    #[test]
    fn test_domain_json_format() {
        let json = r#"{"type":"linear","axis":"threshold","values":[3,1,2]}"#;
        let domain: Domain = serde_json::from_str(json).unwrap();
        assert_eq!(
            domain.normalized(),
            Domain::Linear {
                axis: Axis::Threshold,
                values: vec![1, 2, 3],
            }
        );
    }

    #[test]
    fn test_minimal_sweep_defaults() {
        let json = r#"{
            "id": "seq",
            "strategy": "Sequential",
            "command": "./seq.sh",
            "domain": {"type": "fixed"}
        }"#;
        let spec: SweepSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.metric, MetricKind::Time);
        assert!(spec.sizes.is_empty());
        assert!(!spec.compare);
        spec.validate().unwrap();
    }
}
