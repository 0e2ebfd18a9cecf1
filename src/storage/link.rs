//! Link maintenance between visits, people and places
//!
//! A visit row carries weak links to the person and place it names. Links
//! start empty for forward references and are back-filled when the referent
//! is created. These functions operate on guards the caller already holds;
//! they never take table or index locks themselves, only the per-row lock of
//! the visit being touched.

use std::sync::Arc;

use crate::index::{Buckets, TimeIndex};
use crate::storage::table::{Link, Rows, Shared};
use crate::storage::types::{Person, Place, Visit, VisitFields};

/// A stored visit plus its cached links
#[derive(Debug)]
pub struct VisitRow {
    pub visit: Visit,
    pub person: Link<Person>,
    pub place: Link<Place>,
}

impl VisitRow {
    pub fn new(visit: Visit, person: Link<Person>, place: Link<Place>) -> Self {
        Self {
            visit,
            person,
            place,
        }
    }

    /// The linked person, if it exists
    pub fn person(&self) -> Option<Shared<Person>> {
        self.person.upgrade()
    }

    /// The linked place, if it exists
    pub fn place(&self) -> Option<Shared<Place>> {
        self.place.upgrade()
    }
}

/// Index entries point at the shared row, never at a copy
pub type VisitRef = Shared<VisitRow>;

/// Point every visit in a person's bucket at the newly created person
pub fn backfill_person(bucket: &TimeIndex<VisitRef>, person: &Shared<Person>) -> usize {
    let mut linked = 0;
    bucket.for_each(|_, row| {
        row.write().person = Arc::downgrade(person);
        linked += 1;
    });
    linked
}

/// Point every visit in a place's bucket at the newly created place
pub fn backfill_place(bucket: &TimeIndex<VisitRef>, place: &Shared<Place>) -> usize {
    let mut linked = 0;
    bucket.for_each(|_, row| {
        row.write().place = Arc::downgrade(place);
        linked += 1;
    });
    linked
}

/// Add a new visit to both its place bucket and its person bucket
pub fn index_visit(
    place_index: &mut Buckets<VisitRef>,
    person_index: &mut Buckets<VisitRef>,
    visit: &Visit,
    row: &VisitRef,
) {
    place_index.insert(visit.location, visit.visited_at, visit.id, Arc::clone(row));
    person_index.insert(visit.user, visit.visited_at, visit.id, Arc::clone(row));
}

/// Guards held while a visit update is applied
///
/// Each guard is present only if the update can need it: `people` when the
/// person id is sent, `places` when the place id is sent, `place_index` when
/// the place id or timestamp is sent, `person_index` when the person id or
/// timestamp is sent.
pub struct Relocation<'a> {
    pub people: Option<&'a Rows<Person>>,
    pub places: Option<&'a Rows<Place>>,
    pub place_index: Option<&'a mut Buckets<VisitRef>>,
    pub person_index: Option<&'a mut Buckets<VisitRef>>,
}

/// What an update did to the index positions of a visit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Moved {
    pub place_bucket: bool,
    pub person_bucket: bool,
}

/// Apply a validated update to a visit row
///
/// Entries are removed from their old bucket positions before the keys
/// change and reinserted afterwards, only in the index whose key changed.
pub fn apply_visit_update(row: &VisitRef, fields: VisitFields, guards: Relocation<'_>) -> Moved {
    let mut current = row.write();
    let old = current.visit.clone();

    let location = fields.location.as_value().copied().unwrap_or(old.location);
    let user = fields.user.as_value().copied().unwrap_or(old.user);
    let visited_at = fields.visited_at.as_value().copied().unwrap_or(old.visited_at);

    let moved = Moved {
        place_bucket: location != old.location || visited_at != old.visited_at,
        person_bucket: user != old.user || visited_at != old.visited_at,
    };

    let Relocation {
        people,
        places,
        mut place_index,
        mut person_index,
    } = guards;

    if moved.place_bucket {
        if let Some(index) = place_index.as_deref_mut() {
            index.remove(old.location, old.visited_at, old.id);
        }
    }
    if moved.person_bucket {
        if let Some(index) = person_index.as_deref_mut() {
            index.remove(old.user, old.visited_at, old.id);
        }
    }

    current.visit.location = location;
    current.visit.user = user;
    current.visit.visited_at = visited_at;
    if let Some(mark) = fields.mark.as_value() {
        current.visit.mark = *mark;
    }

    if location != old.location {
        if let Some(places) = places {
            current.place = places.link(location);
        }
    }
    if user != old.user {
        if let Some(people) = people {
            current.person = people.link(user);
        }
    }

    if moved.place_bucket {
        if let Some(index) = place_index {
            index.insert(location, visited_at, old.id, Arc::clone(row));
        }
    }
    if moved.person_bucket {
        if let Some(index) = person_index {
            index.insert(user, visited_at, old.id, Arc::clone(row));
        }
    }

    moved
}
