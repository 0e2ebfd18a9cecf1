//! Bucket collections - one `TimeIndex` per person or per place
//!
//! The whole collection sits behind a single reader/writer lock. Callers
//! take the guard explicitly so that multi-structure operations can hold
//! several locks in the store's fixed order.

use crate::index::TimeIndex;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;

/// Buckets keyed by owner id (person id or place id)
#[derive(Debug)]
pub struct Buckets<V> {
    by_owner: HashMap<u32, TimeIndex<V>>,
}

impl<V> Default for Buckets<V> {
    fn default() -> Self {
        Self {
            by_owner: HashMap::new(),
        }
    }
}

impl<V> Buckets<V> {
    /// Get the bucket for an owner, creating an empty one if absent
    pub fn ensure(&mut self, owner: u32) -> &mut TimeIndex<V> {
        self.by_owner.entry(owner).or_default()
    }

    pub fn get(&self, owner: u32) -> Option<&TimeIndex<V>> {
        self.by_owner.get(&owner)
    }

    pub fn get_mut(&mut self, owner: u32) -> Option<&mut TimeIndex<V>> {
        self.by_owner.get_mut(&owner)
    }

    /// Insert an entry into the owner's bucket, creating the bucket if needed
    pub fn insert(&mut self, owner: u32, timestamp: i64, id: u32, value: V) {
        self.ensure(owner).insert(timestamp, id, value);
    }

    /// Remove an entry from the owner's bucket
    ///
    /// The bucket itself is kept even when it becomes empty.
    pub fn remove(&mut self, owner: u32, timestamp: i64, id: u32) -> bool {
        self.by_owner
            .get_mut(&owner)
            .map(|bucket| bucket.remove(timestamp, id))
            .unwrap_or(false)
    }

    /// Every bucket with its owner id, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &TimeIndex<V>)> + '_ {
        self.by_owner.iter().map(|(&owner, bucket)| (owner, bucket))
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    /// Total entries across all buckets
    pub fn entry_count(&self) -> usize {
        self.by_owner.values().map(TimeIndex::len).sum()
    }
}

/// A named, lock-guarded bucket collection
#[derive(Debug)]
pub struct BucketMap<V> {
    name: &'static str,
    buckets: RwLock<Buckets<V>>,
}

impl<V> BucketMap<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            buckets: RwLock::new(Buckets::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Buckets<V>> {
        self.buckets.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Buckets<V>> {
        self.buckets.write()
    }

    /// Number of buckets (takes the read lock)
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }
}
