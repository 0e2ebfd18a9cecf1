//! # Waypoint
//!
//! In-memory store of people, places and visits, answering time-ranged
//! questions about them over HTTP.
//!
//! ## Features
//!
//! - **Linked records**: Visits cache links to their person and place, and
//!   visits that arrive before either are back-filled later
//! - **Time indexes**: Per-person and per-place buckets ordered by visit time
//! - **Fine-grained locking**: One reader/writer lock per table, per index
//!   and per record, always taken in a fixed order
//! - **Bulk import**: Zip archive of JSON entries loaded at startup
//!
//! ## Modules
//!
//! - [`storage`]: Records, tables, link maintenance and the `Store`
//! - [`index`]: Time-ordered buckets
//! - [`query`]: Visit and average-rating filters and scans
//! - [`import`]: Startup dataset loader
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use waypoint::query::AverageFilter;
//! use waypoint::storage::{Store, VisitFields};
//!
//! let store = Store::new(1_503_695_452);
//! let visit: VisitFields = serde_json::from_str(
//!     r#"{"id": 1, "location": 7, "user": 3, "visited_at": 100, "mark": 4}"#,
//! ).unwrap();
//! store.create_visit(visit).unwrap();
//!
//! // The place does not exist yet
//! assert_eq!(store.average_rating(7, &AverageFilter::new()), None);
//! ```

pub mod api;
pub mod config;
pub mod import;
pub mod index;
pub mod query;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    Gender, Person, PersonFields, Place, PlaceFields, Store, StoreError, StoreResult, StoreStats,
    Visit, VisitFields,
};

pub use query::{AverageFilter, VisitFilter};

pub use import::{import_archive, ImportError, ImportSummary};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, DataConfig, LogFormat, LoggingConfig};
