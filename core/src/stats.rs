//! Reduction of trial samples to summary statistics

use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};
use crate::protocol::Sample;

/// Smallest trial set for which the sample standard deviation is defined
pub const MIN_SAMPLES: usize = 2;

/// Mean and sample standard deviation of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Arithmetic mean
    pub mean: f64,
    /// Standard deviation with the N-1 denominator
    pub stddev: f64,
}

impl Summary {
    /// Summarise `values`; fails for fewer than [`MIN_SAMPLES`] values
    pub fn from_values(values: &[f64]) -> SweepResult<Self> {
        Ok(Self {
            mean: mean(values)?,
            stddev: sample_stddev(values)?,
        })
    }
}

/// Aggregated result of one configuration point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Mean time in milliseconds
    pub mean: f64,
    /// Sample standard deviation of the time in milliseconds
    pub stddev: f64,
    /// Number of trials reduced into this aggregate
    pub samples: usize,
    /// Created-task statistics, for task-count benchmarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Summary>,
}

impl Aggregate {
    /// Reduce a trial set
    ///
    /// The task summary is present when every sample carries a task count.
    /// A set where only some samples do is rejected.
    pub fn from_samples(samples: &[Sample]) -> SweepResult<Self> {
        let times: Vec<f64> = samples.iter().map(|s| s.time_ms).collect();
        let time = Summary::from_values(&times)?;

        let counts: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.tasks_created)
            .map(|c| c as f64)
            .collect();

        let tasks = match counts.len() {
            0 => None,
            n if n == samples.len() => Some(Summary::from_values(&counts)?),
            n => {
                return Err(SweepError::PartialTaskCounts {
                    reported: n,
                    trials: samples.len(),
                })
            }
        };

        Ok(Self {
            mean: time.mean,
            stddev: time.stddev,
            samples: samples.len(),
            tasks,
        })
    }

    /// Time statistics as a [`Summary`]
    pub fn time(&self) -> Summary {
        Summary {
            mean: self.mean,
            stddev: self.stddev,
        }
    }
}

/// Arithmetic mean; fails on an empty slice
pub fn mean(values: &[f64]) -> SweepResult<f64> {
    if values.is_empty() {
        return Err(SweepError::InsufficientSamples {
            required: 1,
            got: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample standard deviation; fails below [`MIN_SAMPLES`] values
pub fn sample_stddev(values: &[f64]) -> SweepResult<f64> {
    if values.len() < MIN_SAMPLES {
        return Err(SweepError::InsufficientSamples {
            required: MIN_SAMPLES,
            got: values.len(),
        });
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}
