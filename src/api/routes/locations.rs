//! Location Routes
//!
//! - GET /locations/:id - Fetch a place
//! - GET /locations/:id/avg - Average mark of a place
//! - POST /locations/new - Create a place
//! - POST /locations/:id - Update a place

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{parse_body, parse_id, QueryParams, RawParams, NEW_RECORD};
use crate::api::dto::{AverageResponse, Empty};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::query::AverageFilter;
use crate::storage::{Gender, Place, PlaceFields};

fn unknown(id: u32) -> ApiError {
    ApiError::NotFound(format!("location {}", id))
}

/// GET /locations/:id
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Place>> {
    let id = parse_id(&id, "location")?;
    state.store.get_place(id).map(Json).ok_or_else(|| unknown(id))
}

/// POST /locations/:id
pub async fn post_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Empty>> {
    if id == NEW_RECORD {
        let fields: PlaceFields = parse_body(&body)?;
        state.store.create_place(fields)?;
        return Ok(Json(Empty {}));
    }

    let id = parse_id(&id, "location")?;
    if !state.store.has_place(id) {
        return Err(unknown(id));
    }

    let fields: PlaceFields = parse_body(&body)?;
    state.store.update_place(id, fields)?;
    Ok(Json(Empty {}))
}

/// GET /locations/:id/avg?fromDate&toDate&fromAge&toAge&gender
pub async fn location_average(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    raw: RawParams,
) -> ApiResult<AverageResponse> {
    let id = parse_id(&id, "location")?;
    if !state.store.has_place(id) {
        return Err(unknown(id));
    }

    let params = QueryParams::from_raw(raw)?;
    let mut filter = AverageFilter::new();
    if let Some(from) = params.parsed("fromDate")? {
        filter = filter.from_date(from);
    }
    if let Some(to) = params.parsed("toDate")? {
        filter = filter.to_date(to);
    }
    if let Some(age) = params.parsed("fromAge")? {
        filter = filter.from_age(age);
    }
    if let Some(age) = params.parsed("toAge")? {
        filter = filter.to_age(age);
    }
    if let Some(gender) = params.text("gender")? {
        let gender = Gender::parse(gender)
            .ok_or_else(|| ApiError::Validation(format!("invalid gender: {:?}", gender)))?;
        filter = filter.gender(gender);
    }

    let avg = state
        .store
        .average_rating(id, &filter)
        .ok_or_else(|| unknown(id))?;

    Ok(AverageResponse { avg })
}
