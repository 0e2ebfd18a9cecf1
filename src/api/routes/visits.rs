//! Visit Routes
//!
//! - GET /visits/:id - Fetch a visit
//! - POST /visits/new - Create a visit
//! - POST /visits/:id - Update a visit (may move it between buckets)

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{parse_body, parse_id, NEW_RECORD};
use crate::api::dto::Empty;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::{Visit, VisitFields};

fn unknown(id: u32) -> ApiError {
    ApiError::NotFound(format!("visit {}", id))
}

/// GET /visits/:id
pub async fn get_visit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Visit>> {
    let id = parse_id(&id, "visit")?;
    state.store.get_visit(id).map(Json).ok_or_else(|| unknown(id))
}

/// POST /visits/:id
pub async fn post_visit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Empty>> {
    if id == NEW_RECORD {
        let fields: VisitFields = parse_body(&body)?;
        state.store.create_visit(fields)?;
        return Ok(Json(Empty {}));
    }

    let id = parse_id(&id, "visit")?;
    if !state.store.has_visit(id) {
        return Err(unknown(id));
    }

    let fields: VisitFields = parse_body(&body)?;
    state.store.update_visit(id, fields)?;
    Ok(Json(Empty {}))
}
