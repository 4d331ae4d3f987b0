//! Configuration keys

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Key of one point in a sweep's result table
///
/// Keys order the way the sweep visits them, so iterating a table yields the
/// chart x-axis order.
pub trait SweepKey: Copy + Ord + Hash + fmt::Debug + fmt::Display + Serialize {}

/// Single-parameter sweeps are keyed by the parameter value
impl SweepKey for u32 {}

/// Composite key of a workers x threshold sweep
///
/// Ordering is by worker count, then threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridKey {
    /// Worker count
    pub workers: u32,
    /// Split threshold
    pub threshold: u32,
}

impl GridKey {
    /// Create a key
    pub fn new(workers: u32, threshold: u32) -> Self {
        Self { workers, threshold }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, th={})", self.workers, self.threshold)
    }
}

impl SweepKey for GridKey {}

/// Every (workers, threshold) pair in visiting order
pub fn grid_points(workers: &[u32], thresholds: &[u32]) -> Vec<GridKey> {
    workers
        .iter()
        .flat_map(|&w| thresholds.iter().map(move |&t| GridKey::new(w, t)))
        .collect()
}
