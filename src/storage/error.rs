//! Store error types
//!
//! Every error here is recoverable and returned to the immediate caller.

use thiserror::Error;

/// Errors returned by store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Creation with an incomplete record
    #[error("Not all required fields are filled")]
    MissingFields,

    /// Creation collides with an existing identifier
    #[error("Record already exists")]
    AlreadyExists,

    /// Operation references an unknown identifier
    #[error("Record does not exist")]
    NotFound,

    /// Update payload carries an identifier
    #[error("Update must not contain an id")]
    IdentifierInBody,

    /// A present field carries null or an invalid value
    #[error("Malformed field: {0}")]
    MalformedField(&'static str),
}

impl StoreError {
    /// Whether this error names an unknown record rather than a bad request
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
