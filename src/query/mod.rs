//! Waypoint Query Engine
//!
//! Filtered range scans over one time-index bucket:
//!
//! - **visits of a person**: date window plus country / distance of the place
//! - **average rating at a place**: date window plus age / gender of the visitor
//!
//! # Example
//!
//! ```rust
//! use waypoint::query::{AverageFilter, VisitFilter};
//! use waypoint::storage::Gender;
//!
//! let visits = VisitFilter::new().from_date(946_684_800).country("Peru");
//! let average = AverageFilter::new().from_age(18).gender(Gender::Female);
//!
//! assert!(visits.needs_place());
//! assert!(average.person_filter(1_500_000_000).is_active());
//! ```

pub mod executor;
pub mod filters;

pub use executor::{average_rating, round_to, visits_of_person, RatingAccumulator, AVERAGE_PRECISION};
pub use filters::{years_before, AverageFilter, PersonFilter, VisitFilter};
