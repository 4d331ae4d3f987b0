//! Repeated trials for a single configuration point

use indicatif::ProgressBar;

use crate::config::ConfigError;
use crate::error::SweepResult;
use crate::protocol::MetricKind;
use crate::runner::SampleCollector;
use crate::stats::{Aggregate, MIN_SAMPLES};
use crate::traits::BenchmarkRunner;

/// Runs a command a fixed number of times and reduces the samples
pub struct TrialAggregator<R> {
    collector: SampleCollector<R>,
    repeats: usize,
}

impl<R: BenchmarkRunner> TrialAggregator<R> {
    /// Create an aggregator; fails fast when `repeats` is below 2
    pub fn new(runner: R, repeats: usize) -> SweepResult<Self> {
        if repeats < MIN_SAMPLES {
            return Err(ConfigError::InvalidRepeats(repeats).into());
        }
        Ok(Self {
            collector: SampleCollector::new(runner),
            repeats,
        })
    }

    /// Trials per point
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Access the underlying runner
    pub fn runner(&self) -> &R {
        self.collector.runner()
    }

    /// Run `command` `repeats` times, one process after the other
    ///
    /// The first failing trial aborts the point; no sample is dropped or
    /// substituted.
    pub async fn aggregate(
        &self,
        command: &str,
        kind: MetricKind,
        progress: &ProgressBar,
    ) -> SweepResult<Aggregate> {
        let mut samples = Vec::with_capacity(self.repeats);
        for _ in 0..self.repeats {
            samples.push(self.collector.collect(command, kind).await?);
            progress.inc(1);
        }
        Aggregate::from_samples(&samples)
    }
}
