//! Result tables keyed by configuration

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

use super::key::SweepKey;
use crate::error::{SweepError, SweepResult};
use crate::stats::Aggregate;

/// Aggregates of every point of one sweep
///
/// Filled once by the sweep that owns it and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<K> {
    entries: BTreeMap<K, Aggregate>,
}

impl<K: SweepKey> ResultTable<K> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert the aggregate of a new point
    pub fn insert(&mut self, key: K, aggregate: Aggregate) -> SweepResult<()> {
        if self.entries.contains_key(&key) {
            return Err(SweepError::DuplicateKey(key.to_string()));
        }
        self.entries.insert(key, aggregate);
        Ok(())
    }

    /// Aggregate for `key`
    pub fn get(&self, key: &K) -> Option<&Aggregate> {
        self.entries.get(key)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no points
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Aggregate)> {
        self.entries.iter()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }
}

impl<K: SweepKey> Default for ResultTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SweepKey> FromIterator<(K, Aggregate)> for ResultTable<K> {
    /// Later duplicates overwrite earlier ones; use [`ResultTable::insert`]
    /// when duplicates must be detected
    fn from_iter<I: IntoIterator<Item = (K, Aggregate)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct Entry<'a, K> {
    key: &'a K,
    #[serde(flatten)]
    aggregate: &'a Aggregate,
}

impl<K: SweepKey> Serialize for ResultTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(key, aggregate)| Entry { key, aggregate }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::key::GridKey;

    fn agg(mean: f64) -> Aggregate {
        Aggregate {
            mean,
            stddev: 1.0,
            samples: 2,
            tasks: None,
        }
    }

    #[test]
    fn test_insert_and_iterate_in_key_order() {
        let mut table = ResultTable::new();
        table.insert(8u32, agg(3.0)).unwrap();
        table.insert(1u32, agg(1.0)).unwrap();
        table.insert(4u32, agg(2.0)).unwrap();

        let keys: Vec<u32> = table.keys().copied().collect();
        assert_eq!(keys, vec![1, 4, 8]);
        assert_eq!(table.get(&4).unwrap().mean, 2.0);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = ResultTable::new();
        table.insert(GridKey::new(2, 16), agg(1.0)).unwrap();
        let err = table.insert(GridKey::new(2, 16), agg(2.0)).unwrap_err();

        assert!(matches!(err, SweepError::DuplicateKey(k) if k == "(2, th=16)"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_serialize_as_entry_list() {
        let table: ResultTable<GridKey> = [(GridKey::new(1, 16), agg(5.0))].into_iter().collect();
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json[0]["key"]["workers"], 1);
        assert_eq!(json[0]["key"]["threshold"], 16);
        assert_eq!(json[0]["mean"], 5.0);
    }
}
