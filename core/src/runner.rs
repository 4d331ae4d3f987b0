//! Benchmark process execution and sample collection
//!
//! [`ShellRunner`] is the production [`BenchmarkRunner`]; tests substitute
//! scripted runners.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{SweepError, SweepResult};
use crate::protocol::{parse_sample, MetricKind, Sample};
use crate::traits::{BenchmarkRunner, CommandOutput};

/// Runs commands through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    /// Create a runner without a timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill and fail trials that run longer than `timeout`
    ///
    /// On Unix each trial runs in its own process group and the whole group
    /// is killed, including processes the script started in the background.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl BenchmarkRunner for ShellRunner {
    async fn run(&self, command: &str) -> SweepResult<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| SweepError::Spawn {
            command: command.to_string(),
            source,
        })?;
        let pid = child.id();

        let output = match self.timeout {
            Some(after) => match tokio::time::timeout(after, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    if let Some(pid) = pid {
                        kill_process_group(pid).await;
                    }
                    return Err(SweepError::Timeout {
                        command: command.to_string(),
                        after,
                    });
                }
            },
            None => child.wait_with_output().await?,
        };

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Kill every process left in the group led by `pid`
///
/// The group id equals the pid of `sh`, which started it.
#[cfg(unix)]
async fn kill_process_group(pid: u32) {
    let result = Command::new("kill")
        .args(["-s", "KILL", "--", &format!("-{pid}")])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = result {
        tracing::warn!(pid, error = %e, "failed to kill timed-out process group");
    }
}

#[cfg(not(unix))]
async fn kill_process_group(_pid: u32) {}

/// Runs a single trial and extracts its sample
pub struct SampleCollector<R> {
    runner: R,
}

impl<R: BenchmarkRunner> SampleCollector<R> {
    /// Wrap a runner
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Access the underlying runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Execute `command` once and parse the metrics of `kind` from its stdout
    pub async fn collect(&self, command: &str, kind: MetricKind) -> SweepResult<Sample> {
        tracing::debug!(command, "running trial");
        let output = self.runner.run(command).await?;

        if !output.is_success() {
            tracing::warn!(
                command,
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "benchmark exited unsuccessfully"
            );
        }

        parse_sample(&output.stdout, kind)
            .map_err(|e| SweepError::from_protocol(e, command, &output.stdout))
    }
}
