//! Waypoint Store
//!
//! The store is the single context object holding:
//! - three record tables (people, places, visits)
//! - two bucket collections indexing visits by person and by place
//! - the reference time used to turn ages into birth-date cutoffs
//!
//! # Lock order
//!
//! Every path takes locks in this order and never the reverse:
//!
//! ```text
//! people → places → visits → place index → person index → visit row → person/place row
//! ```
//!
//! Any prefix may be skipped. Reads hand back copies, never guards.

use std::sync::Arc;

use crate::index::BucketMap;
use crate::query::{self, AverageFilter, VisitFilter};
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::link::{self, Relocation, VisitRef, VisitRow};
use crate::storage::table::RecordTable;
use crate::storage::types::{
    Person, PersonFields, Place, PlaceFields, StoreStats, Visit, VisitFields, VisitProjection,
};

/// In-memory store of people, places and visits
pub struct Store {
    people: RecordTable<Person>,
    places: RecordTable<Place>,
    visits: RecordTable<VisitRow>,
    place_index: BucketMap<VisitRef>,
    person_index: BucketMap<VisitRef>,
    /// Unix seconds; "now" for age filters
    reference_time: i64,
}

impl Store {
    /// Create an empty store with a fixed reference time
    pub fn new(reference_time: i64) -> Self {
        Self {
            people: RecordTable::new("people"),
            places: RecordTable::new("places"),
            visits: RecordTable::new("visits"),
            place_index: BucketMap::new("visits_by_place"),
            person_index: BucketMap::new("visits_by_person"),
            reference_time,
        }
    }

    pub fn reference_time(&self) -> i64 {
        self.reference_time
    }

    // ==================== People ====================

    /// Create a person from client fields
    pub fn create_person(&self, fields: PersonFields) -> StoreResult<()> {
        self.insert_person(fields.into_person()?)
    }

    /// Insert a complete person and back-fill visits that already name it
    pub fn insert_person(&self, person: Person) -> StoreResult<()> {
        let id = person.id;
        let shared = self.people.write().insert(id, person)?;

        let mut buckets = self.person_index.write();
        let linked = link::backfill_person(buckets.ensure(id), &shared);
        if linked > 0 {
            tracing::debug!(person_id = id, linked, "Back-filled person links");
        }
        Ok(())
    }

    pub fn get_person(&self, id: u32) -> Option<Person> {
        self.people.snapshot(id)
    }

    pub fn has_person(&self, id: u32) -> bool {
        self.people.contains(id)
    }

    /// Apply the fields present in `fields` to an existing person
    pub fn update_person(&self, id: u32, fields: PersonFields) -> StoreResult<()> {
        let people = self.people.write();
        let person = people.get(id).ok_or(StoreError::NotFound)?;
        fields.check_update()?;
        fields.apply(&mut person.write());
        Ok(())
    }

    // ==================== Places ====================

    pub fn create_place(&self, fields: PlaceFields) -> StoreResult<()> {
        self.insert_place(fields.into_place()?)
    }

    /// Insert a complete place and back-fill visits that already name it
    pub fn insert_place(&self, place: Place) -> StoreResult<()> {
        let id = place.id;
        let shared = self.places.write().insert(id, place)?;

        let mut buckets = self.place_index.write();
        let linked = link::backfill_place(buckets.ensure(id), &shared);
        if linked > 0 {
            tracing::debug!(place_id = id, linked, "Back-filled place links");
        }
        Ok(())
    }

    pub fn get_place(&self, id: u32) -> Option<Place> {
        self.places.snapshot(id)
    }

    pub fn has_place(&self, id: u32) -> bool {
        self.places.contains(id)
    }

    pub fn update_place(&self, id: u32, fields: PlaceFields) -> StoreResult<()> {
        let places = self.places.write();
        let place = places.get(id).ok_or(StoreError::NotFound)?;
        fields.check_update()?;
        fields.apply(&mut place.write());
        Ok(())
    }

    // ==================== Visits ====================

    pub fn create_visit(&self, fields: VisitFields) -> StoreResult<()> {
        self.insert_visit(fields.into_visit()?)
    }

    /// Insert a complete visit into the visit table and both indexes
    ///
    /// The person and place tables stay read-locked until the visit is in
    /// its buckets, so a concurrent creation of either referent either is
    /// seen here or sees this visit when it back-fills.
    pub fn insert_visit(&self, visit: Visit) -> StoreResult<()> {
        let people = self.people.read();
        let places = self.places.read();
        let mut visits = self.visits.write();

        let row = VisitRow::new(visit.clone(), people.link(visit.user), places.link(visit.location));
        let shared = visits.insert(visit.id, row)?;

        let mut place_index = self.place_index.write();
        let mut person_index = self.person_index.write();
        link::index_visit(&mut place_index, &mut person_index, &visit, &shared);
        Ok(())
    }

    pub fn get_visit(&self, id: u32) -> Option<Visit> {
        let visits = self.visits.read();
        let visit = visits.get(id)?.read().visit.clone();
        Some(visit)
    }

    pub fn has_visit(&self, id: u32) -> bool {
        self.visits.contains(id)
    }

    /// Apply the fields present in `fields` to an existing visit
    ///
    /// Changing the person, the place or the time moves the visit's index
    /// entries and refreshes the matching cached link.
    pub fn update_visit(&self, id: u32, fields: VisitFields) -> StoreResult<()> {
        let people = fields.user.as_value().map(|_| self.people.read());
        let places = fields.location.as_value().map(|_| self.places.read());
        let visits = self.visits.write();

        let row: VisitRef = Arc::clone(visits.get(id).ok_or(StoreError::NotFound)?);
        fields.check_update()?;

        let touches_time = !fields.visited_at.is_absent();
        let mut place_index = (touches_time || !fields.location.is_absent())
            .then(|| self.place_index.write());
        let mut person_index =
            (touches_time || !fields.user.is_absent()).then(|| self.person_index.write());

        let moved = link::apply_visit_update(
            &row,
            fields,
            Relocation {
                people: people.as_deref(),
                places: places.as_deref(),
                place_index: place_index.as_deref_mut(),
                person_index: person_index.as_deref_mut(),
            },
        );

        if moved.place_bucket || moved.person_bucket {
            tracing::debug!(
                visit_id = id,
                place_bucket = moved.place_bucket,
                person_bucket = moved.person_bucket,
                "Relocated visit index entries"
            );
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Visits of a person under `filter`; `None` iff the person is unknown
    pub fn visits_by_person(&self, id: u32, filter: &VisitFilter) -> Option<Vec<VisitProjection>> {
        if !self.has_person(id) {
            return None;
        }
        let buckets = self.person_index.read();
        Some(
            buckets
                .get(id)
                .map(|bucket| query::visits_of_person(bucket, filter))
                .unwrap_or_default(),
        )
    }

    /// Average rating at a place under `filter`; `None` iff the place is unknown
    pub fn average_rating(&self, id: u32, filter: &AverageFilter) -> Option<f64> {
        if !self.has_place(id) {
            return None;
        }
        let buckets = self.place_index.read();
        Some(
            buckets
                .get(id)
                .map(|bucket| query::average_rating(bucket, filter, self.reference_time))
                .unwrap_or(0.0),
        )
    }

    // ==================== Stats ====================

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            people: self.people.len(),
            places: self.places.len(),
            visits: self.visits.len(),
            place_buckets: self.place_index.bucket_count(),
            person_buckets: self.person_index.bucket_count(),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("stats", &self.stats())
            .field("reference_time", &self.reference_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Buckets;
    use crate::storage::types::{Field, Gender};

    const REFERENCE: i64 = 1_501_545_600; // 2017-08-01

    fn person(id: u32, gender: Gender, birth_date: i64) -> Person {
        Person {
            id,
            email: format!("p{}@example.com", id),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            gender,
            birth_date,
        }
    }

    fn place(id: u32, country: &str, distance: u32) -> Place {
        Place {
            id,
            place: format!("Sight {}", id),
            country: country.to_string(),
            city: "City".to_string(),
            distance,
        }
    }

    fn visit(id: u32, location: u32, user: u32, visited_at: i64, mark: u8) -> Visit {
        Visit {
            id,
            location,
            user,
            visited_at,
            mark,
        }
    }

    /// How often a visit appears in the place index and the person index
    fn occurrences(store: &Store, id: u32) -> (usize, usize) {
        let count = |buckets: &Buckets<VisitRef>| {
            let mut hits = 0;
            for (_, bucket) in buckets.iter() {
                bucket.for_each(|_, row| {
                    if row.read().visit.id == id {
                        hits += 1;
                    }
                });
            }
            hits
        };
        (
            count(&*store.place_index.read()),
            count(&*store.person_index.read()),
        )
    }

    #[test]
    fn test_create_and_get() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_place(place(2, "Chile", 5)).unwrap();
        store.insert_visit(visit(3, 2, 1, 100, 4)).unwrap();

        assert_eq!(store.get_person(1).unwrap().id, 1);
        assert_eq!(store.get_place(2).unwrap().country, "Chile");
        assert_eq!(store.get_visit(3).unwrap().mark, 4);
        assert!(store.get_visit(4).is_none());
        assert_eq!(store.stats().visits, 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        let err = store.insert_person(person(1, Gender::Female, 99)).unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists);
        assert_eq!(store.get_person(1).unwrap().gender, Gender::Male);

        store.insert_visit(visit(5, 1, 1, 10, 1)).unwrap();
        let err = store.insert_visit(visit(5, 2, 2, 20, 2)).unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists);
        assert_eq!(store.get_visit(5).unwrap().location, 1);
        assert_eq!(occurrences(&store, 5), (1, 1));
    }

    #[test]
    fn test_create_requires_all_fields() {
        let store = Store::new(REFERENCE);
        let fields = PlaceFields {
            id: Field::Value(1),
            place: Field::Value("Arch".to_string()),
            ..Default::default()
        };
        assert_eq!(store.create_place(fields), Err(StoreError::MissingFields));
        assert!(!store.has_place(1));
    }

    #[test]
    fn test_update_errors_and_priority() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();

        let with_id = PersonFields {
            id: Field::Value(1),
            ..Default::default()
        };
        assert_eq!(store.update_person(1, with_id.clone()), Err(StoreError::IdentifierInBody));
        assert_eq!(store.update_person(2, with_id), Err(StoreError::NotFound));

        let with_null = PersonFields {
            email: Field::Null,
            ..Default::default()
        };
        assert_eq!(
            store.update_person(1, with_null),
            Err(StoreError::MalformedField("email"))
        );
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        let before = store.get_place(1).unwrap();

        store
            .update_place(
                1,
                PlaceFields {
                    distance: Field::Value(9),
                    ..Default::default()
                },
            )
            .unwrap();

        let after = store.get_place(1).unwrap();
        assert_eq!(after.distance, 9);
        assert_eq!(Place { distance: 5, ..after }, before);
    }

    #[test]
    fn test_forward_reference_is_backfilled() {
        let store = Store::new(REFERENCE);
        store.insert_visit(visit(1, 20, 10, 100, 5)).unwrap();

        assert_eq!(store.visits_by_person(10, &VisitFilter::new()), None);
        assert_eq!(store.average_rating(20, &AverageFilter::new()), None);

        store.insert_person(person(10, Gender::Female, 0)).unwrap();
        store.insert_place(place(20, "Peru", 3)).unwrap();

        let visits = store.visits_by_person(10, &VisitFilter::new().country("Peru")).unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].place.as_deref(), Some("Sight 20"));

        let avg = store
            .average_rating(20, &AverageFilter::new().gender(Gender::Female))
            .unwrap();
        assert_eq!(avg, 5.0);
    }

    #[test]
    fn test_empty_but_existing() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_person(person(1, Gender::Male, 0)).unwrap();

        assert_eq!(store.average_rating(1, &AverageFilter::new()), Some(0.0));
        assert_eq!(store.average_rating(2, &AverageFilter::new()), None);
        assert_eq!(store.visits_by_person(1, &VisitFilter::new()), Some(Vec::new()));
    }

    #[test]
    fn test_range_exclusivity() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_place(place(1, "Chile", 5)).unwrap();
        for (id, t) in [(1, 10), (2, 20), (3, 30)] {
            store.insert_visit(visit(id, 1, 1, t, 3)).unwrap();
        }

        let visits = store
            .visits_by_person(1, &VisitFilter::new().from_date(10).to_date(30))
            .unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].visited_at, 20);
    }

    #[test]
    fn test_average_with_gender_filter() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_person(person(2, Gender::Male, 0)).unwrap();
        store.insert_person(person(3, Gender::Female, 0)).unwrap();
        store.insert_visit(visit(1, 1, 1, 10, 2)).unwrap();
        store.insert_visit(visit(2, 1, 2, 20, 3)).unwrap();
        store.insert_visit(visit(3, 1, 3, 30, 5)).unwrap();

        assert_eq!(store.average_rating(1, &AverageFilter::new()), Some(3.33333));
        assert_eq!(
            store.average_rating(1, &AverageFilter::new().gender(Gender::Male)),
            Some(2.5)
        );
    }

    #[test]
    fn test_timestamp_update_relocates_once() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_visit(visit(7, 1, 1, 100, 3)).unwrap();

        store
            .update_visit(
                7,
                VisitFields {
                    visited_at: Field::Value(900),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(occurrences(&store, 7), (1, 1));
        let visits = store.visits_by_person(1, &VisitFilter::new()).unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].visited_at, 900);
        assert!(store
            .visits_by_person(1, &VisitFilter::new().to_date(500))
            .unwrap()
            .is_empty());
        assert_eq!(
            store.average_rating(1, &AverageFilter::new().from_date(500)),
            Some(3.0)
        );
    }

    #[test]
    fn test_foreign_key_update_moves_and_relinks() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_person(person(2, Gender::Female, 0)).unwrap();
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_place(place(2, "Peru", 5)).unwrap();
        store.insert_visit(visit(7, 1, 1, 100, 4)).unwrap();

        store
            .update_visit(
                7,
                VisitFields {
                    user: Field::Value(2),
                    location: Field::Value(2),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.visits_by_person(1, &VisitFilter::new()), Some(Vec::new()));
        let moved = store.visits_by_person(2, &VisitFilter::new().country("Peru")).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(store.average_rating(1, &AverageFilter::new()), Some(0.0));
        assert_eq!(
            store.average_rating(2, &AverageFilter::new().gender(Gender::Female)),
            Some(4.0)
        );
        assert_eq!(occurrences(&store, 7), (1, 1));
    }

    #[test]
    fn test_visit_update_to_unknown_person_unlinks() {
        let store = Store::new(REFERENCE);
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_visit(visit(7, 1, 1, 100, 4)).unwrap();

        store
            .update_visit(
                7,
                VisitFields {
                    user: Field::Value(50),
                    ..Default::default()
                },
            )
            .unwrap();
        let filter = AverageFilter::new().gender(Gender::Male);
        assert_eq!(store.average_rating(1, &filter), Some(0.0));

        store.insert_person(person(50, Gender::Male, 0)).unwrap();
        assert_eq!(store.average_rating(1, &filter), Some(4.0));
    }

    #[test]
    fn test_mark_only_update() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_visit(visit(7, 1, 1, 100, 4)).unwrap();

        store
            .update_visit(
                7,
                VisitFields {
                    mark: Field::Value(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.average_rating(1, &AverageFilter::new()), Some(1.0));

        let bad = VisitFields {
            mark: Field::Value(9),
            ..Default::default()
        };
        assert_eq!(store.update_visit(7, bad), Err(StoreError::MalformedField("mark")));
        assert_eq!(store.get_visit(7).unwrap().mark, 1);
    }

    #[test]
    fn test_person_update_visible_through_links() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        store.insert_visit(visit(7, 1, 1, 100, 4)).unwrap();

        let filter = AverageFilter::new().gender(Gender::Female);
        assert_eq!(store.average_rating(1, &filter), Some(0.0));

        store
            .update_person(
                1,
                PersonFields {
                    gender: Field::Value(Gender::Female),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.average_rating(1, &filter), Some(4.0));
    }

    #[test]
    fn test_age_filters_use_reference_time() {
        let store = Store::new(REFERENCE);
        let thirty_years_ago = query::years_before(REFERENCE, 30);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_person(person(1, Gender::Male, thirty_years_ago - 1)).unwrap();
        store.insert_person(person(2, Gender::Male, thirty_years_ago + 1)).unwrap();
        store.insert_visit(visit(1, 1, 1, 10, 5)).unwrap();
        store.insert_visit(visit(2, 1, 2, 20, 1)).unwrap();

        assert_eq!(store.average_rating(1, &AverageFilter::new().from_age(30)), Some(5.0));
        assert_eq!(store.average_rating(1, &AverageFilter::new().to_age(30)), Some(1.0));
    }

    #[test]
    fn test_concurrent_reads_and_relocations() {
        let store = Store::new(REFERENCE);
        store.insert_place(place(1, "Chile", 5)).unwrap();
        store.insert_person(person(1, Gender::Male, 0)).unwrap();
        for id in 0..50 {
            store.insert_visit(visit(id, 1, 1, i64::from(id) * 10, 3)).unwrap();
        }

        std::thread::scope(|s| {
            s.spawn(|| {
                for round in 0..200i64 {
                    let id = (round % 50) as u32;
                    let fields = VisitFields {
                        visited_at: Field::Value(10_000 + round),
                        ..Default::default()
                    };
                    store.update_visit(id, fields).unwrap();
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let visits = store.visits_by_person(1, &VisitFilter::new()).unwrap();
                        assert_eq!(visits.len(), 50);
                        assert_eq!(store.average_rating(1, &AverageFilter::new()), Some(3.0));
                    }
                });
            }
        });

        for id in 0..50 {
            assert_eq!(occurrences(&store, id), (1, 1));
        }
    }
}
