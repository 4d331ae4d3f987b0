//! Best-configuration selection

use serde::Serialize;

use crate::error::{SweepError, SweepResult};
use crate::stats::Aggregate;
use crate::sweep::{ResultTable, SweepKey};

/// The configuration with the lowest mean time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Best<K> {
    /// Winning configuration
    pub key: K,
    /// Its aggregate
    pub aggregate: Aggregate,
}

/// Find the entry with the minimum mean
///
/// On an exact tie the first entry in table order wins.
pub fn best<K: SweepKey>(table: &ResultTable<K>) -> SweepResult<Best<K>> {
    table
        .iter()
        .fold(None::<Best<K>>, |acc, (key, agg)| match acc {
            Some(b) if b.aggregate.mean <= agg.mean => Some(b),
            _ => Some(Best {
                key: *key,
                aggregate: *agg,
            }),
        })
        .ok_or(SweepError::EmptyTable)
}

impl<K: SweepKey> ResultTable<K> {
    /// See [`best`]
    pub fn best(&self) -> SweepResult<Best<K>> {
        best(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::GridKey;

    fn agg(mean: f64) -> Aggregate {
        Aggregate {
            mean,
            stddev: 0.5,
            samples: 10,
            tasks: None,
        }
    }

    #[test]
    fn test_best_of_three() {
        let table: ResultTable<u32> = [(1, agg(120.0)), (2, agg(95.5)), (4, agg(200.0))]
            .into_iter()
            .collect();

        let b = best(&table).unwrap();
        assert_eq!(b.key, 2);
        assert_eq!(b.aggregate.mean, 95.5);
    }

    #[test]
    fn test_best_grid() {
        let table: ResultTable<GridKey> = [
            (GridKey::new(1, 16), agg(400.0)),
            (GridKey::new(8, 32), agg(61.0)),
            (GridKey::new(8, 64), agg(70.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.best().unwrap().key, GridKey::new(8, 32));
    }

    #[test]
    fn test_tie_returns_first_in_order() {
        let table: ResultTable<u32> = [(4, agg(10.0)), (2, agg(10.0)), (8, agg(12.0))]
            .into_iter()
            .collect();

        assert_eq!(best(&table).unwrap().key, 2);
    }

    #[test]
    fn test_empty_table_fails() {
        let table: ResultTable<u32> = ResultTable::new();
        assert!(matches!(best(&table), Err(SweepError::EmptyTable)));
    }
}
