//! Bulk Import
//!
//! Loads the startup dataset into a `Store`:
//! - **archive**: zip of `users_N.json`, `locations_N.json`, `visits_N.json`
//! - **options**: `options.txt`, whose first line is the reference time
//!
//! Rejected records (duplicates, missing fields) are counted and logged;
//! only unreadable input fails the import.

mod archive;
mod options;

pub use archive::{import_archive, import_reader, EntryKind, ImportSummary};
pub use options::{parse_reference_time, read_reference_time, resolve_reference_time};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing the dataset
#[derive(Error, Debug)]
pub enum ImportError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry is not valid JSON of the expected shape
    #[error("Invalid JSON in {entry}: {error}")]
    Json {
        entry: String,
        error: serde_json::Error,
    },

    /// An entry name does not follow `<kind>_<n>.json`
    #[error("Unsupported archive entry: {0}")]
    UnsupportedEntry(String),

    /// The options file is missing a usable reference time
    #[error("Invalid options file {path:?}: {reason}")]
    Options { path: PathBuf, reason: String },
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
