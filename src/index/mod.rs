//! Waypoint Index Structures
//!
//! Secondary, time-ordered indexes over visits:
//!
//! - **TimeIndex**: in-memory B-tree keyed by `(visited_at, visit id)`
//! - **BucketMap**: one `TimeIndex` per person or per place, behind one
//!   reader/writer lock per collection
//!
//! # Architecture
//!
//! ```text
//! Query: "visits of person 12 after 2001-01-01"
//!        ↓
//! person BucketMap: bucket 12
//!        ↓
//! TimeIndex: range (from, +inf) → [visit 3, visit 9, visit 40]
//!        ↓
//! Filters on cached place / person links → results
//! ```

mod buckets;
mod time_index;

pub use buckets::{BucketMap, Buckets};
pub use time_index::{Range, TimeIndex};
