//! API Routes
//!
//! Route handlers organized by record kind, plus the shared
//! path, body and query-string helpers.

pub mod health;
pub mod locations;
pub mod users;
pub mod visits;

use axum::extract::{rejection::QueryRejection, Query};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

use crate::api::error::{ApiError, ApiResult};

/// Path segment that creates instead of updating
pub const NEW_RECORD: &str = "new";

/// Fallback for unrouted paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound("no such route".to_string())
}

/// Parse a record id from its path segment
///
/// An id that cannot name a record is reported as not found.
pub fn parse_id(raw: &str, kind: &str) -> ApiResult<u32> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("{} {}", kind, raw)))
}

/// Decode a JSON request body
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("invalid body: {}", e)))
}

/// Raw query string parameters, checked only after the record is known
pub type RawParams = Result<Query<HashMap<String, String>>, QueryRejection>;

/// Typed access to query string parameters
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn from_raw(raw: RawParams) -> ApiResult<Self> {
        raw.map(|Query(map)| Self(map))
            .map_err(|e| ApiError::Validation(format!("invalid query string: {}", e)))
    }

    /// A present parameter that must parse as `T`
    pub fn parsed<T: FromStr>(&self, key: &str) -> ApiResult<Option<T>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ApiError::Validation(format!("invalid {}: {:?}", key, value))),
        }
    }

    /// A present parameter that must not be empty
    pub fn text(&self, key: &str) -> ApiResult<Option<&str>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) if value.is_empty() => {
                Err(ApiError::Validation(format!("empty {}", key)))
            }
            Some(value) => Ok(Some(value.as_str())),
        }
    }
}
