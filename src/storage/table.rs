//! Record tables
//!
//! A table owns the canonical copy of every record of one type. Records are
//! held as `Arc<RwLock<T>>` so that visits can keep non-owning `Weak`
//! links to the people and places they name. The table itself is guarded by
//! one reader/writer lock, independent of every other table.

use crate::storage::error::{StoreError, StoreResult};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A table-owned record
pub type Shared<T> = Arc<RwLock<T>>;

/// A non-owning link to a table-owned record
pub type Link<T> = Weak<RwLock<T>>;

/// Rows of one table, keyed by id
#[derive(Debug)]
pub struct Rows<T> {
    by_id: HashMap<u32, Shared<T>>,
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }
}

impl<T> Rows<T> {
    pub fn get(&self, id: u32) -> Option<&Shared<T>> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Insert a new record; an id already in use is rejected untouched
    pub fn insert(&mut self, id: u32, record: T) -> StoreResult<Shared<T>> {
        if self.by_id.contains_key(&id) {
            return Err(StoreError::AlreadyExists);
        }
        let shared = Arc::new(RwLock::new(record));
        self.by_id.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    /// Weak link to a record, or an empty link if the id is unknown
    pub fn link(&self, id: u32) -> Link<T> {
        self.by_id.get(&id).map(Arc::downgrade).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// A named, lock-guarded table
#[derive(Debug)]
pub struct RecordTable<T> {
    name: &'static str,
    rows: RwLock<Rows<T>>,
}

impl<T> RecordTable<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(Rows::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Rows<T>> {
        self.rows.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Rows<T>> {
        self.rows.write()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.rows.read().contains(id)
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<T: Clone> RecordTable<T> {
    /// Copy of a record, consistent with respect to concurrent updates
    pub fn snapshot(&self, id: u32) -> Option<T> {
        let rows = self.rows.read();
        let record = rows.get(id)?.read().clone();
        Some(record)
    }
}
