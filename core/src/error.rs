//! Error types for sweep-bench-core

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::ProtocolError;

/// Core error type
///
/// Every variant is fatal to a benchmark run. Variants that originate in a
/// child process carry the command line and the raw captured output so the
/// failing trial can be reproduced by hand.
#[derive(Error, Debug)]
pub enum SweepError {
    /// A required marker never appeared in the child's output
    #[error("metric '{label}' not found in output of `{command}`:\n{output}")]
    MissingMetric {
        /// Marker that was searched for
        label: String,
        /// Command line that produced the output
        command: String,
        /// Raw captured standard output
        output: String,
    },

    /// A marker was present but its value did not parse
    #[error("metric '{label}' has malformed value '{value}' in output of `{command}`:\n{output}")]
    MalformedMetric {
        /// Marker whose value was malformed
        label: String,
        /// Offending text after the colon
        value: String,
        /// Command line that produced the output
        command: String,
        /// Raw captured standard output
        output: String,
    },

    /// Statistics requested over fewer samples than the estimator needs
    #[error("at least {required} samples are required, got {got}")]
    InsufficientSamples {
        /// Minimum sample count
        required: usize,
        /// Samples actually available
        got: usize,
    },

    /// A grid cell of the workers x thresholds cross product has no entry
    #[error("incomplete sweep: no result for workers={workers}, threshold={threshold}")]
    IncompleteSweep {
        /// Worker count of the missing cell
        workers: u32,
        /// Threshold of the missing cell
        threshold: u32,
    },

    /// A task-count chart was requested for a point that reported no counts
    #[error("no created-task counts recorded at threshold {0}")]
    MissingTaskCounts(u32),

    /// Only some trials of a point reported a created-task count
    #[error("only {reported} of {trials} trials reported a created-task count")]
    PartialTaskCounts {
        /// Trials that carried a count
        reported: usize,
        /// Trials in the set
        trials: usize,
    },

    /// A compared sweep was never run at the comparison size
    #[error("sweep '{sweep}' has no run at size {}", .size.map_or("none".to_string(), |n| n.to_string()))]
    MissingRun {
        /// Id of the sweep
        sweep: String,
        /// Size the comparison asked for
        size: Option<u32>,
    },

    /// Selection over a result table with no entries
    #[error("result table is empty")]
    EmptyTable,

    /// A configuration key was inserted twice into the same table
    #[error("duplicate configuration key {0}")]
    DuplicateKey(String),

    /// The child process could not be spawned
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// Command line that failed
        command: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child process did not exit within the trial timeout
    #[error("`{command}` did not finish within {after:?}")]
    Timeout {
        /// Command line that hung
        command: String,
        /// Configured timeout
        after: Duration,
    },

    /// A command template could not be rendered for a configuration point
    #[error("cannot render command template '{template}': {reason}")]
    Template {
        /// The template text
        template: String,
        /// Why rendering failed
        reason: String,
    },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SweepError {
    /// Attach command and output context to a protocol parse failure
    pub fn from_protocol(err: ProtocolError, command: &str, output: &str) -> Self {
        match err {
            ProtocolError::MissingMetric { label } => SweepError::MissingMetric {
                label,
                command: command.to_string(),
                output: output.to_string(),
            },
            ProtocolError::MalformedMetric { label, value } => SweepError::MalformedMetric {
                label,
                value,
                command: command.to_string(),
                output: output.to_string(),
            },
        }
    }

    /// Create a template rendering error
    pub fn template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        SweepError::Template {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type SweepResult<T> = std::result::Result<T, SweepError>;
