//! Waypoint Storage Engine
//!
//! This module provides the in-memory core:
//!
//! - **types**: Records (Person, Place, Visit) and partial-record fields
//! - **table**: Lock-guarded record tables
//! - **link**: Cached visit → person/place links and index relocation
//! - **engine**: The `Store` context tying tables and indexes together
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Record → Table (canonical copy) → Link maintenance → Place / person buckets
//!
//! Read Path:
//!   Lookup → Table snapshot
//!   Query  → Bucket range scan → Filters on cached links → Results
//! ```
//!
//! # Example
//!
//! ```rust
//! use waypoint::query::{AverageFilter, VisitFilter};
//! use waypoint::storage::{Gender, Person, Place, Store, Visit};
//!
//! let store = Store::new(1_500_000_000);
//!
//! // A visit may name people and places that do not exist yet
//! store.insert_visit(Visit { id: 1, location: 2, user: 3, visited_at: 100, mark: 4 }).unwrap();
//! store.insert_place(Place {
//!     id: 2,
//!     place: "Lighthouse".into(),
//!     country: "Norway".into(),
//!     city: "Bergen".into(),
//!     distance: 12,
//! }).unwrap();
//! store.insert_person(Person {
//!     id: 3,
//!     email: "kari@example.com".into(),
//!     first_name: "Kari".into(),
//!     last_name: "Nordmann".into(),
//!     gender: Gender::Female,
//!     birth_date: 0,
//! }).unwrap();
//!
//! let visits = store.visits_by_person(3, &VisitFilter::new().country("Norway")).unwrap();
//! assert_eq!(visits.len(), 1);
//! assert_eq!(store.average_rating(2, &AverageFilter::new()), Some(4.0));
//! ```

pub mod engine;
pub mod error;
pub mod link;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use engine::Store;
pub use error::{StoreError, StoreResult};
pub use link::{VisitRef, VisitRow};
pub use table::{Link, RecordTable, Rows, Shared};
pub use types::{
    Field, Gender, Person, PersonFields, Place, PlaceFields, StoreStats, Visit, VisitFields,
    VisitProjection, MAX_MARK,
};
