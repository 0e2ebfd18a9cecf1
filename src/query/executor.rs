//! Query Executor - scans one time-index bucket under filters
//!
//! The executor works on a bucket the caller has already located and
//! locked. It reads each visit row and the person or place it links to
//! under their own row locks, one row at a time.

use crate::index::TimeIndex;
use crate::query::filters::{AverageFilter, VisitFilter};
use crate::storage::{VisitProjection, VisitRef};

/// Decimal places kept in an average rating
pub const AVERAGE_PRECISION: i32 = 5;

/// Visits of one person, ascending by visit time
pub fn visits_of_person(bucket: &TimeIndex<VisitRef>, filter: &VisitFilter) -> Vec<VisitProjection> {
    let mut results = Vec::new();

    for (_, row) in bucket.range(filter.from_date, filter.to_date) {
        let row = row.read();
        let place = row.place();
        let place = place.as_ref().map(|p| p.read());

        if !filter.matches_place(place.as_deref()) {
            continue;
        }

        results.push(VisitProjection {
            mark: row.visit.mark,
            place: place.map(|p| p.place.clone()),
            visited_at: row.visit.visited_at,
        });
    }

    results
}

/// Running sum of ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingAccumulator {
    sum: u64,
    count: u64,
}

impl RatingAccumulator {
    pub fn add(&mut self, mark: u8) {
        self.sum += u64::from(mark);
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean rounded to `AVERAGE_PRECISION` places; 0 when empty
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round_to(self.sum as f64 / self.count as f64, AVERAGE_PRECISION)
    }
}

/// Average rating of the visits at one place
pub fn average_rating(
    bucket: &TimeIndex<VisitRef>,
    filter: &AverageFilter,
    reference_time: i64,
) -> f64 {
    let people = filter.person_filter(reference_time);
    let mut acc = RatingAccumulator::default();

    for (_, row) in bucket.range(filter.from_date, filter.to_date) {
        let row = row.read();

        if people.is_active() {
            let person = row.person();
            let person = person.as_ref().map(|p| p.read());
            if !people.matches(person.as_deref()) {
                continue;
            }
        }

        acc.add(row.visit.mark);
    }

    acc.average()
}

/// Round half away from zero to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
