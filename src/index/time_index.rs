//! Time Index - ordered map of visit entries keyed by timestamp
//!
//! Keys are `(timestamp, visit id)`: timestamps repeat, the id breaks ties
//! and gives every entry an exact identity for removal.
//!
//! # Performance
//! - Insert: O(log n)
//! - Remove: O(log n)
//! - Range scan: O(log n + k) where k = results

use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

/// One bucket: every visit of a single person, or at a single place
#[derive(Debug)]
pub struct TimeIndex<V> {
    entries: BTreeMap<(i64, u32), V>,
}

impl<V> Default for TimeIndex<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> TimeIndex<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced (same timestamp and id)
    pub fn insert(&mut self, timestamp: i64, id: u32, value: V) -> Option<V> {
        self.entries.insert((timestamp, id), value)
    }

    /// Remove the entry with exactly this timestamp and id
    pub fn remove(&mut self, timestamp: i64, id: u32) -> bool {
        self.entries.remove(&(timestamp, id)).is_some()
    }

    pub fn contains(&self, timestamp: i64, id: u32) -> bool {
        self.entries.contains_key(&(timestamp, id))
    }

    /// Entries with `from < timestamp < to`, ascending
    ///
    /// A `None` bound is open. Every call starts a fresh scan.
    pub fn range(&self, from: Option<i64>, to: Option<i64>) -> Range<'_, V> {
        if let (Some(from), Some(to)) = (from, to) {
            if from >= to {
                return Range {
                    inner: self.entries.range((Bound::Included((0, 0)), Bound::Excluded((0, 0)))),
                };
            }
        }

        let lower = match from {
            Some(from) => Bound::Excluded((from, u32::MAX)),
            None => Bound::Unbounded,
        };
        let upper = match to {
            Some(to) => Bound::Excluded((to, 0)),
            None => Bound::Unbounded,
        };

        Range {
            inner: self.entries.range((lower, upper)),
        }
    }

    /// Visit every entry in ascending order
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(i64, &V),
    {
        for (&(timestamp, _), value) in &self.entries {
            f(timestamp, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp range covered by this bucket
    pub fn time_bounds(&self) -> Option<(i64, i64)> {
        let first = self.entries.keys().next()?;
        let last = self.entries.keys().next_back()?;
        Some((first.0, last.0))
    }
}

/// Ascending scan over part of a `TimeIndex`
pub struct Range<'a, V> {
    inner: btree_map::Range<'a, (i64, u32), V>,
}

impl<'a, V> Iterator for Range<'a, V> {
    type Item = (i64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&(timestamp, _), value)| (timestamp, value))
    }
}
