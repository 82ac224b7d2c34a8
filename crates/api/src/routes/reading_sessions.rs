use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use library_core::wire::{DateReadingEntryPayload, ReadingLogPayload, ReadingProgressPayload};
use serde_json::{Value, json};

use super::{book_id, entry_date, session_id};
use crate::dto::{DeadlineRequest, EntryUpdateRequest};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(book): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let logs = state.reading_sessions.list_sessions(book_id(&book)?).await?;
    let sessions: Vec<ReadingLogPayload> = logs.iter().map(ReadingLogPayload::from).collect();
    Ok(Json(json!({ "readingSessions": sessions })))
}

pub async fn current_session(
    State(state): State<AppState>,
    Path(book): Path<String>,
) -> Result<Json<ReadingLogPayload>, ApiError> {
    let log = state
        .reading_sessions
        .current_session(book_id(&book)?)
        .await?;
    Ok(Json(ReadingLogPayload::from(&log)))
}

pub async fn start_session(
    State(state): State<AppState>,
    Path(book): Path<String>,
    req: Result<Json<DeadlineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReadingLogPayload>), ApiError> {
    let book = book_id(&book)?;
    let Json(req) = req?;
    let log = state
        .reading_sessions
        .start_session(book, req.deadline)
        .await?;
    Ok((StatusCode::CREATED, Json(ReadingLogPayload::from(&log))))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
) -> Result<Json<ReadingLogPayload>, ApiError> {
    let log = state
        .reading_sessions
        .get_session(book_id(&book)?, session_id(&session)?)
        .await?;
    Ok(Json(ReadingLogPayload::from(&log)))
}

pub async fn update_deadline(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
    req: Result<Json<DeadlineRequest>, JsonRejection>,
) -> Result<Json<ReadingLogPayload>, ApiError> {
    let (book, session) = (book_id(&book)?, session_id(&session)?);
    let Json(req) = req?;
    let log = state
        .reading_sessions
        .update_deadline(book, session, req.deadline)
        .await?;
    Ok(Json(ReadingLogPayload::from(&log)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .reading_sessions
        .delete_session(book_id(&book)?, session_id(&session)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_entries(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let entries = state
        .reading_sessions
        .list_entries(book_id(&book)?, session_id(&session)?)
        .await?;
    let entries: Vec<DateReadingEntryPayload> =
        entries.iter().map(DateReadingEntryPayload::from).collect();
    Ok(Json(json!({ "dateReadingSessions": entries })))
}

pub async fn record_entry(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
    req: Result<Json<DateReadingEntryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<DateReadingEntryPayload>), ApiError> {
    let (book, session) = (book_id(&book)?, session_id(&session)?);
    let Json(req) = req?;
    let entry = state
        .reading_sessions
        .record_entry(book, session, req.into_entry()?)
        .await?;
    Ok((StatusCode::CREATED, Json(DateReadingEntryPayload::from(&entry))))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path((book, session, date)): Path<(String, String, String)>,
) -> Result<Json<DateReadingEntryPayload>, ApiError> {
    let entry = state
        .reading_sessions
        .get_entry(book_id(&book)?, session_id(&session)?, entry_date(&date)?)
        .await?;
    Ok(Json(DateReadingEntryPayload::from(&entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path((book, session, date)): Path<(String, String, String)>,
    req: Result<Json<EntryUpdateRequest>, JsonRejection>,
) -> Result<Json<DateReadingEntryPayload>, ApiError> {
    let (book, session, date) = (book_id(&book)?, session_id(&session)?, entry_date(&date)?);
    let Json(req) = req?;
    let corrected = DateReadingEntryPayload {
        date,
        last_read_page: req.last_read_page,
        bookmark: req.bookmark,
    }
    .into_entry()?;
    let entry = state
        .reading_sessions
        .update_entry(
            book,
            session,
            date,
            corrected.last_read_page(),
            corrected.bookmark().map(str::to_owned),
        )
        .await?;
    Ok(Json(DateReadingEntryPayload::from(&entry)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((book, session, date)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .reading_sessions
        .delete_entry(book_id(&book)?, session_id(&session)?, entry_date(&date)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session_progress(
    State(state): State<AppState>,
    Path((book, session)): Path<(String, String)>,
) -> Result<Json<ReadingProgressPayload>, ApiError> {
    let progress = state
        .reading_sessions
        .progress(book_id(&book)?, session_id(&session)?)
        .await?;
    Ok(Json(ReadingProgressPayload::from(&progress)))
}
