//! Core record types for the Waypoint store
//!
//! This module defines the records held by the store and the partial
//! records used to create and update them:
//! - `Person`, `Place`, `Visit`: canonical records
//! - `Field`: tri-state field value (absent / explicit null / value)
//! - `PersonFields`, `PlaceFields`, `VisitFields`: partial records
//! - `VisitProjection`: one row of a visits-by-person answer

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::storage::error::{StoreError, StoreResult};

/// Highest rating a visit may carry
pub const MAX_MARK: u8 = 5;

/// Gender of a person
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// Parse the one-letter wire form (`m` / `f`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "m" => Some(Gender::Male),
            "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "m"),
            Gender::Female => write!(f, "f"),
        }
    }
}

/// A registered traveller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Unix timestamp in seconds (may be negative)
    pub birth_date: i64,
}

/// A sight that can be visited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Place {
    pub id: u32,
    /// Name of the sight
    pub place: String,
    pub country: String,
    pub city: String,
    /// Distance from the city centre
    pub distance: u32,
}

/// One visit of a person to a place
///
/// `location` and `user` are foreign keys and may name records that do not
/// exist yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Visit {
    pub id: u32,
    /// Place id
    pub location: u32,
    /// Person id
    pub user: u32,
    /// Unix timestamp in seconds
    pub visited_at: i64,
    /// Rating, 0..=5
    pub mark: u8,
}

/// A field of a partial record
///
/// Distinguishes a field that was left out (`Absent`) from one that was sent
/// with an explicit null (`Null`). Deserializes from `Option<T>`; combine with
/// `#[serde(default)]` so missing keys become `Absent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Value required for creation; absent and null both count as missing
    pub fn required(self) -> StoreResult<T> {
        match self {
            Field::Value(v) => Ok(v),
            Field::Absent | Field::Null => Err(StoreError::MissingFields),
        }
    }

    /// Reject explicit nulls in an update, naming the offending field
    fn check_not_null(&self, name: &'static str) -> StoreResult<()> {
        if self.is_null() {
            return Err(StoreError::MalformedField(name));
        }
        Ok(())
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

/// Fields of a person as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonFields {
    #[serde(default)]
    pub id: Field<u32>,
    #[serde(default)]
    pub email: Field<String>,
    #[serde(default)]
    pub first_name: Field<String>,
    #[serde(default)]
    pub last_name: Field<String>,
    #[serde(default)]
    pub gender: Field<Gender>,
    #[serde(default)]
    pub birth_date: Field<i64>,
}

impl PersonFields {
    /// Build a complete person, failing with `MissingFields` on any gap
    pub fn into_person(self) -> StoreResult<Person> {
        Ok(Person {
            id: self.id.required()?,
            email: self.email.required()?,
            first_name: self.first_name.required()?,
            last_name: self.last_name.required()?,
            gender: self.gender.required()?,
            birth_date: self.birth_date.required()?,
        })
    }

    /// Validate as an update body without touching any record
    pub fn check_update(&self) -> StoreResult<()> {
        if !self.id.is_absent() {
            return Err(StoreError::IdentifierInBody);
        }
        self.email.check_not_null("email")?;
        self.first_name.check_not_null("first_name")?;
        self.last_name.check_not_null("last_name")?;
        self.gender.check_not_null("gender")?;
        self.birth_date.check_not_null("birth_date")
    }

    /// Apply every present field; call `check_update` first
    pub fn apply(self, person: &mut Person) {
        if let Field::Value(email) = self.email {
            person.email = email;
        }
        if let Field::Value(first_name) = self.first_name {
            person.first_name = first_name;
        }
        if let Field::Value(last_name) = self.last_name {
            person.last_name = last_name;
        }
        if let Field::Value(gender) = self.gender {
            person.gender = gender;
        }
        if let Field::Value(birth_date) = self.birth_date {
            person.birth_date = birth_date;
        }
    }
}

/// Fields of a place as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceFields {
    #[serde(default)]
    pub id: Field<u32>,
    #[serde(default)]
    pub place: Field<String>,
    #[serde(default)]
    pub country: Field<String>,
    #[serde(default)]
    pub city: Field<String>,
    #[serde(default)]
    pub distance: Field<u32>,
}

impl PlaceFields {
    pub fn into_place(self) -> StoreResult<Place> {
        Ok(Place {
            id: self.id.required()?,
            place: self.place.required()?,
            country: self.country.required()?,
            city: self.city.required()?,
            distance: self.distance.required()?,
        })
    }

    pub fn check_update(&self) -> StoreResult<()> {
        if !self.id.is_absent() {
            return Err(StoreError::IdentifierInBody);
        }
        self.place.check_not_null("place")?;
        self.country.check_not_null("country")?;
        self.city.check_not_null("city")?;
        self.distance.check_not_null("distance")
    }

    pub fn apply(self, place: &mut Place) {
        if let Field::Value(name) = self.place {
            place.place = name;
        }
        if let Field::Value(country) = self.country {
            place.country = country;
        }
        if let Field::Value(city) = self.city {
            place.city = city;
        }
        if let Field::Value(distance) = self.distance {
            place.distance = distance;
        }
    }
}

/// Fields of a visit as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitFields {
    #[serde(default)]
    pub id: Field<u32>,
    #[serde(default)]
    pub location: Field<u32>,
    #[serde(default)]
    pub user: Field<u32>,
    #[serde(default)]
    pub visited_at: Field<i64>,
    #[serde(default)]
    pub mark: Field<u8>,
}

impl VisitFields {
    pub fn into_visit(self) -> StoreResult<Visit> {
        let visit = Visit {
            id: self.id.required()?,
            location: self.location.required()?,
            user: self.user.required()?,
            visited_at: self.visited_at.required()?,
            mark: self.mark.required()?,
        };
        if visit.mark > MAX_MARK {
            return Err(StoreError::MalformedField("mark"));
        }
        Ok(visit)
    }

    pub fn check_update(&self) -> StoreResult<()> {
        if !self.id.is_absent() {
            return Err(StoreError::IdentifierInBody);
        }
        self.location.check_not_null("location")?;
        self.user.check_not_null("user")?;
        self.visited_at.check_not_null("visited_at")?;
        self.mark.check_not_null("mark")?;
        if self.mark.as_value().is_some_and(|m| *m > MAX_MARK) {
            return Err(StoreError::MalformedField("mark"));
        }
        Ok(())
    }

    /// Whether applying these fields moves the visit in either time index
    pub fn moves_index_entry(&self) -> bool {
        !self.location.is_absent() || !self.user.is_absent() || !self.visited_at.is_absent()
    }
}

/// One row of a visits-by-person answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitProjection {
    pub mark: u8,
    /// Name of the visited place; `None` while the place is unknown
    pub place: Option<String>,
    pub visited_at: i64,
}

/// Record and bucket counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub people: usize,
    pub places: usize,
    pub visits: usize,
    pub person_buckets: usize,
    pub place_buckets: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} people, {} places, {} visits",
            self.people, self.places, self.visits
        )
    }
}
