use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use library_core::wire::{self, ReadingLogPayload, ReadingProgressPayload};

use crate::dto::ProgressQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Project a reading log supplied in the request body without touching storage.
pub async fn compute_progress(
    State(state): State<AppState>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
    payload: Result<Json<ReadingLogPayload>, JsonRejection>,
) -> Result<Json<ReadingProgressPayload>, ApiError> {
    let Query(query) = query?;
    let Json(payload) = payload?;
    let today = query.today.unwrap_or_else(|| state.clock.today());
    Ok(Json(wire::compute_payload(payload, today)?))
}
