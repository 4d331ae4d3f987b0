//! Line-oriented `label: value` protocol spoken by benchmark executables
//!
//! A benchmark prints free-form text on standard output. The harness only
//! cares about lines that contain a known label; for those, everything after
//! the first `:` is the value.
//!
//! ```text
//! Resolviendo N=14 con 8 threads
//! Tiempo (ms): 412.7
//! Virtual threads realmente creados: 2184
//! ```

use serde::{Deserialize, Serialize};

/// Marker preceding the wall-clock time in milliseconds
pub const TIME_LABEL: &str = "Tiempo (ms)";

/// Marker preceding the number of lightweight tasks actually created
pub const TASKS_LABEL: &str = "Virtual threads realmente creados";

/// Which metrics a benchmark is expected to report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Only the time line is required
    #[default]
    Time,
    /// Both the time and the created-tasks lines are required
    TimeAndTasks,
}

/// One parsed trial result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock time in milliseconds
    pub time_ms: f64,

    /// Lightweight tasks created (task-count benchmarks only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_created: Option<u64>,
}

impl Sample {
    /// A time-only sample
    pub fn time(time_ms: f64) -> Self {
        Self {
            time_ms,
            tasks_created: None,
        }
    }

    /// A sample with a created-task count
    pub fn with_tasks(time_ms: f64, tasks_created: u64) -> Self {
        Self {
            time_ms,
            tasks_created: Some(tasks_created),
        }
    }
}

/// Parse failures, before command context is attached
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// No line contained the label
    #[error("metric '{label}' not found")]
    MissingMetric {
        /// Label that was searched for
        label: String,
    },

    /// The value after the colon is not of the expected type
    #[error("metric '{label}' has malformed value '{value}'")]
    MalformedMetric {
        /// Label whose value is malformed
        label: String,
        /// Text after the colon
        value: String,
    },
}

/// Find the raw value of the first line containing `label`
fn find_value<'a>(output: &'a str, label: &str) -> Result<&'a str, ProtocolError> {
    let line = output
        .lines()
        .find(|line| line.contains(label))
        .ok_or_else(|| ProtocolError::MissingMetric {
            label: label.to_string(),
        })?;

    line.split_once(':')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| ProtocolError::MalformedMetric {
            label: label.to_string(),
            value: line.trim().to_string(),
        })
}

/// Parse the time metric in milliseconds
pub fn parse_time(output: &str) -> Result<f64, ProtocolError> {
    let raw = find_value(output, TIME_LABEL)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ProtocolError::MalformedMetric {
            label: TIME_LABEL.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parse the created-tasks metric
pub fn parse_tasks(output: &str) -> Result<u64, ProtocolError> {
    let raw = find_value(output, TASKS_LABEL)?;
    raw.parse::<u64>()
        .map_err(|_| ProtocolError::MalformedMetric {
            label: TASKS_LABEL.to_string(),
            value: raw.to_string(),
        })
}

/// Parse a full sample of the given kind
pub fn parse_sample(output: &str, kind: MetricKind) -> Result<Sample, ProtocolError> {
    let time_ms = parse_time(output)?;
    match kind {
        MetricKind::Time => Ok(Sample::time(time_ms)),
        MetricKind::TimeAndTasks => Ok(Sample::with_tasks(time_ms, parse_tasks(output)?)),
    }
}
