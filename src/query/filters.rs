//! Query filters
//!
//! Date bounds are exclusive on both ends. Age bounds are whole years and
//! are turned into birth-date cutoffs once per query, against the store's
//! reference time rather than the wall clock.

use chrono::{DateTime, Months};

use crate::storage::{Gender, Person, Place};

/// Filters for the visits of one person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    /// Keep visits strictly after this timestamp
    pub from_date: Option<i64>,
    /// Keep visits strictly before this timestamp
    pub to_date: Option<i64>,
    /// Keep visits to places in this country
    pub country: Option<String>,
    /// Keep visits to places strictly closer than this distance
    pub to_distance: Option<u32>,
}

impl VisitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, timestamp: i64) -> Self {
        self.from_date = Some(timestamp);
        self
    }

    pub fn to_date(mut self, timestamp: i64) -> Self {
        self.to_date = Some(timestamp);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn to_distance(mut self, distance: u32) -> Self {
        self.to_distance = Some(distance);
        self
    }

    /// Whether a filter needs the visited place to decide
    pub fn needs_place(&self) -> bool {
        self.country.is_some() || self.to_distance.is_some()
    }

    /// Place predicate; an unknown place fails every place filter
    pub fn matches_place(&self, place: Option<&Place>) -> bool {
        if !self.needs_place() {
            return true;
        }
        let Some(place) = place else {
            return false;
        };
        if let Some(country) = &self.country {
            if &place.country != country {
                return false;
            }
        }
        if let Some(max) = self.to_distance {
            if place.distance >= max {
                return false;
            }
        }
        true
    }
}

/// Filters for the average rating at one place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageFilter {
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
    /// Keep visitors older than this many years
    pub from_age: Option<u32>,
    /// Keep visitors younger than this many years
    pub to_age: Option<u32>,
    pub gender: Option<Gender>,
}

impl AverageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, timestamp: i64) -> Self {
        self.from_date = Some(timestamp);
        self
    }

    pub fn to_date(mut self, timestamp: i64) -> Self {
        self.to_date = Some(timestamp);
        self
    }

    pub fn from_age(mut self, years: u32) -> Self {
        self.from_age = Some(years);
        self
    }

    pub fn to_age(mut self, years: u32) -> Self {
        self.to_age = Some(years);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Resolve age bounds against the reference time
    pub fn person_filter(&self, reference_time: i64) -> PersonFilter {
        PersonFilter {
            born_before: self.from_age.map(|years| years_before(reference_time, years)),
            born_after: self.to_age.map(|years| years_before(reference_time, years)),
            gender: self.gender,
        }
    }
}

/// Person predicate with age bounds already resolved to timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonFilter {
    /// Keep people born strictly before this timestamp
    pub born_before: Option<i64>,
    /// Keep people born strictly after this timestamp
    pub born_after: Option<i64>,
    pub gender: Option<Gender>,
}

impl PersonFilter {
    pub fn is_active(&self) -> bool {
        self.born_before.is_some() || self.born_after.is_some() || self.gender.is_some()
    }

    /// An unknown person fails every active person filter
    pub fn matches(&self, person: Option<&Person>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(person) = person else {
            return false;
        };
        if let Some(cutoff) = self.born_before {
            if person.birth_date >= cutoff {
                return false;
            }
        }
        if let Some(cutoff) = self.born_after {
            if person.birth_date <= cutoff {
                return false;
            }
        }
        if let Some(gender) = self.gender {
            if person.gender != gender {
                return false;
            }
        }
        true
    }
}

/// The instant `years` calendar years before `reference_time` (epoch seconds)
pub fn years_before(reference_time: i64, years: u32) -> i64 {
    DateTime::from_timestamp(reference_time, 0)
        .and_then(|t| t.checked_sub_months(Months::new(years.saturating_mul(12))))
        .map(|t| t.timestamp())
        .unwrap_or(i64::MIN)
}
