//! User Routes
//!
//! - GET /users/:id - Fetch a person
//! - GET /users/:id/visits - Visits of a person, ordered by time
//! - POST /users/new - Create a person
//! - POST /users/:id - Update a person

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{parse_body, parse_id, QueryParams, RawParams, NEW_RECORD};
use crate::api::dto::{Empty, VisitsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::query::VisitFilter;
use crate::storage::{Person, PersonFields};

fn unknown(id: u32) -> ApiError {
    ApiError::NotFound(format!("user {}", id))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(&id, "user")?;
    state.store.get_person(id).map(Json).ok_or_else(|| unknown(id))
}

/// POST /users/:id
///
/// `new` creates; any other segment updates an existing person.
pub async fn post_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Empty>> {
    if id == NEW_RECORD {
        let fields: PersonFields = parse_body(&body)?;
        state.store.create_person(fields)?;
        return Ok(Json(Empty {}));
    }

    let id = parse_id(&id, "user")?;
    if !state.store.has_person(id) {
        return Err(unknown(id));
    }

    let fields: PersonFields = parse_body(&body)?;
    state.store.update_person(id, fields)?;
    Ok(Json(Empty {}))
}

/// GET /users/:id/visits?fromDate&toDate&country&toDistance
pub async fn user_visits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    raw: RawParams,
) -> ApiResult<Json<VisitsResponse>> {
    let id = parse_id(&id, "user")?;
    if !state.store.has_person(id) {
        return Err(unknown(id));
    }

    let params = QueryParams::from_raw(raw)?;
    let mut filter = VisitFilter::new();
    if let Some(from) = params.parsed("fromDate")? {
        filter = filter.from_date(from);
    }
    if let Some(to) = params.parsed("toDate")? {
        filter = filter.to_date(to);
    }
    if let Some(country) = params.text("country")? {
        filter = filter.country(country);
    }
    if let Some(distance) = params.parsed("toDistance")? {
        filter = filter.to_distance(distance);
    }

    let visits = state
        .store
        .visits_by_person(id, &filter)
        .ok_or_else(|| unknown(id))?;

    Ok(Json(VisitsResponse::from(visits)))
}
