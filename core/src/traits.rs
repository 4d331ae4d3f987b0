//! Core traits for benchmark execution and chart rendering
//!
//! These traits are defined in core so that the sweep engine never depends on
//! process plumbing or a plotting backend. Implementations live in
//! [`crate::runner`] and in the report crate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SweepResult;
use crate::presentation::Chart;

// ============================================================================
// Benchmark Runner Trait
// ============================================================================

/// Captured result of one child process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Complete standard output
    pub stdout: String,
    /// Complete standard error
    pub stderr: String,
    /// Exit code, `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Output of a process that exited with status 0
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Whether the process exited with status 0
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes one benchmark command line
///
/// Each call spawns exactly one fresh process and waits for it to exit.
/// Implementations must not retry.
#[async_trait]
pub trait BenchmarkRunner: Send + Sync {
    /// Run `command` to completion and capture its output
    async fn run(&self, command: &str) -> SweepResult<CommandOutput>;
}

// ============================================================================
// Visualizer Trait
// ============================================================================

/// Turns planned charts into image files
pub trait Visualizer {
    /// Backend error type
    type Error;

    /// Render `chart` into `dir`, returning the written file path
    fn render(&self, chart: &Chart, dir: &Path) -> Result<PathBuf, Self::Error>;

    /// Render every chart in order
    fn render_all(&self, charts: &[Chart], dir: &Path) -> Result<Vec<PathBuf>, Self::Error> {
        charts.iter().map(|chart| self.render(chart, dir)).collect()
    }
}
