//! Data Transfer Objects
//!
//! Response types for the API endpoints. Request bodies deserialize
//! straight into the store's field records.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::query::AVERAGE_PRECISION;
use crate::storage::{StoreStats, VisitProjection};

/// Body of every successful write: `{}`
#[derive(Debug, Serialize)]
pub struct Empty {}

// ============================================
// QUERY DTOs
// ============================================

/// One visit in a visits-by-person answer
#[derive(Debug, Serialize)]
pub struct VisitEntry {
    pub mark: u8,
    /// Place name, empty while the place is unknown
    pub place: String,
    pub visited_at: i64,
}

impl From<VisitProjection> for VisitEntry {
    fn from(p: VisitProjection) -> Self {
        Self {
            mark: p.mark,
            place: p.place.unwrap_or_default(),
            visited_at: p.visited_at,
        }
    }
}

/// `GET /users/{id}/visits` response
#[derive(Debug, Serialize)]
pub struct VisitsResponse {
    pub visits: Vec<VisitEntry>,
}

impl From<Vec<VisitProjection>> for VisitsResponse {
    fn from(visits: Vec<VisitProjection>) -> Self {
        Self {
            visits: visits.into_iter().map(VisitEntry::from).collect(),
        }
    }
}

/// `GET /locations/{id}/avg` response
///
/// Written by hand so the number always carries five decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageResponse {
    pub avg: f64,
}

impl AverageResponse {
    pub fn to_json(&self) -> String {
        format!(
            "{{\"avg\":{:.*}}}",
            AVERAGE_PRECISION as usize,
            self.avg
        )
    }
}

impl IntoResponse for AverageResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "application/json")], self.to_json()).into_response()
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "loading"
    pub status: String,
    pub records: StoreStats,
    pub reference_time: i64,
    pub uptime_seconds: u64,
    pub version: String,
}
