//! Benchmarks for the Waypoint store
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use waypoint::query::{AverageFilter, VisitFilter};
use waypoint::storage::{Gender, Person, Place, Store, Visit, VisitFields};

const PEOPLE: u32 = 1_000;
const PLACES: u32 = 200;
const REFERENCE_TIME: i64 = 1_503_695_452;

fn populated_store(visits: u32) -> Store {
    let store = Store::new(REFERENCE_TIME);

    for id in 0..PEOPLE {
        store
            .insert_person(Person {
                id,
                email: format!("p{}@bench.io", id),
                first_name: "Bench".into(),
                last_name: "Person".into(),
                gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
                birth_date: -(id as i64) * 1_000_000,
            })
            .unwrap();
    }

    for id in 0..PLACES {
        store
            .insert_place(Place {
                id,
                place: format!("Place {}", id),
                country: if id % 3 == 0 { "Spain" } else { "Chile" }.into(),
                city: "City".into(),
                distance: id % 50,
            })
            .unwrap();
    }

    for id in 0..visits {
        store
            .insert_visit(Visit {
                id,
                location: id % PLACES,
                user: id % PEOPLE,
                visited_at: id as i64 * 60,
                mark: (id % 6) as u8,
            })
            .unwrap();
    }

    store
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000u32, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("visits_{}", size), |b| {
            b.iter(|| populated_store(black_box(size)))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let store = populated_store(100_000);
    let mut group = c.benchmark_group("query");

    group.bench_function("visits_by_person", |b| {
        let filter = VisitFilter::new();
        b.iter(|| store.visits_by_person(black_box(17), &filter))
    });

    group.bench_function("visits_by_person_filtered", |b| {
        let filter = VisitFilter::new()
            .from_date(1_000_000)
            .country("Spain")
            .to_distance(25);
        b.iter(|| store.visits_by_person(black_box(17), &filter))
    });

    group.bench_function("average_rating", |b| {
        let filter = AverageFilter::new();
        b.iter(|| store.average_rating(black_box(3), &filter))
    });

    group.bench_function("average_rating_by_age", |b| {
        let filter = AverageFilter::new().from_age(20).to_age(40).gender(Gender::Female);
        b.iter(|| store.average_rating(black_box(3), &filter))
    });

    group.finish();
}

fn bench_relocation(c: &mut Criterion) {
    let store = populated_store(100_000);
    let mut group = c.benchmark_group("update");

    let mut toggle = false;
    group.bench_function("move_visit", |b| {
        b.iter(|| {
            toggle = !toggle;
            let body = if toggle {
                r#"{"user": 1, "location": 2, "visited_at": 5}"#
            } else {
                r#"{"user": 3, "location": 4, "visited_at": 600}"#
            };
            let fields: VisitFields = serde_json::from_str(body).unwrap();
            store.update_visit(black_box(42), fields).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_queries, bench_relocation);
criterion_main!(benches);
