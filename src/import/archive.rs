//! Zip archive import
//!
//! Entries are named `<kind>_<n>.json`, possibly inside a folder, and hold
//! `{"<kind>": [...]}`. People and places are loaded before visits so most
//! links resolve on insert; the store back-fills the rest either way.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use super::{ImportError, ImportResult};
use crate::storage::{PersonFields, PlaceFields, Store, StoreError, VisitFields};

/// What an archive entry contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Users,
    Locations,
    Visits,
    /// `options.txt`; read separately, skipped here
    Options,
}

impl EntryKind {
    /// Classify an entry by its file name
    pub fn from_entry_name(name: &str) -> Option<Self> {
        let file = name.rsplit('/').next().unwrap_or(name);
        let stem = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);

        if stem == "options" {
            return Some(EntryKind::Options);
        }

        let (kind, number) = stem.split_once('_')?;
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match kind {
            "users" => Some(EntryKind::Users),
            "locations" => Some(EntryKind::Locations),
            "visits" => Some(EntryKind::Visits),
            _ => None,
        }
    }
}

/// Counts from one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data entries read from the archive
    pub entries: usize,
    pub people: usize,
    pub places: usize,
    pub visits: usize,
    /// Records the store refused
    pub rejected: usize,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entries: {} people, {} places, {} visits ({} rejected)",
            self.entries, self.people, self.places, self.visits, self.rejected
        )
    }
}

#[derive(Deserialize)]
struct UsersEntry {
    #[serde(default)]
    users: Vec<PersonFields>,
}

#[derive(Deserialize)]
struct LocationsEntry {
    #[serde(default)]
    locations: Vec<PlaceFields>,
}

#[derive(Deserialize)]
struct VisitsEntry {
    #[serde(default)]
    visits: Vec<VisitFields>,
}

/// Import a zip archive from disk
pub fn import_archive(store: &Store, path: &Path) -> ImportResult<ImportSummary> {
    tracing::info!("Importing archive {:?}", path);
    let file = File::open(path)?;
    import_reader(store, BufReader::new(file))
}

/// Import a zip archive from any seekable reader
pub fn import_reader<R: Read + Seek>(store: &Store, reader: R) -> ImportResult<ImportSummary> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let kind = EntryKind::from_entry_name(&name)
            .ok_or_else(|| ImportError::UnsupportedEntry(name.clone()))?;
        entries.push((kind, name, i));
    }
    entries.sort();

    let mut summary = ImportSummary::default();

    for (kind, name, index) in entries {
        if kind == EntryKind::Options {
            tracing::debug!(entry = %name, "Skipping options entry");
            continue;
        }

        let mut content = String::new();
        archive.by_index(index)?.read_to_string(&mut content)?;
        tracing::debug!(entry = %name, bytes = content.len(), "Reading archive entry");

        let rejected = match kind {
            EntryKind::Users => {
                let entry: UsersEntry = parse_entry(&name, &content)?;
                let (accepted, rejected) = load(entry.users, |f| store.create_person(f));
                summary.people += accepted;
                rejected
            }
            EntryKind::Locations => {
                let entry: LocationsEntry = parse_entry(&name, &content)?;
                let (accepted, rejected) = load(entry.locations, |f| store.create_place(f));
                summary.places += accepted;
                rejected
            }
            EntryKind::Visits => {
                let entry: VisitsEntry = parse_entry(&name, &content)?;
                let (accepted, rejected) = load(entry.visits, |f| store.create_visit(f));
                summary.visits += accepted;
                rejected
            }
            EntryKind::Options => continue,
        };

        if rejected > 0 {
            tracing::warn!(entry = %name, rejected, "Some imported records were rejected");
        }
        summary.rejected += rejected;
        summary.entries += 1;
    }

    tracing::info!(
        people = summary.people,
        places = summary.places,
        visits = summary.visits,
        rejected = summary.rejected,
        "Archive import completed"
    );

    Ok(summary)
}

fn parse_entry<'a, T: Deserialize<'a>>(name: &str, content: &'a str) -> ImportResult<T> {
    serde_json::from_str(content).map_err(|error| ImportError::Json {
        entry: name.to_string(),
        error,
    })
}

/// Feed records to the store, returning (accepted, rejected)
fn load<T, F>(records: Vec<T>, mut create: F) -> (usize, usize)
where
    F: FnMut(T) -> Result<(), StoreError>,
{
    let mut accepted = 0;
    let mut rejected = 0;

    for record in records {
        match create(record) {
            Ok(()) => accepted += 1,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected imported record");
                rejected += 1;
            }
        }
    }
    (accepted, rejected)
}
