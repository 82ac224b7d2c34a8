use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::{Value, json};

use super::book_id;
use crate::dto::{BookRequest, BookResponse, BookSearchQuery};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<BookSearchQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let books = state.books.list_books(query.search.as_deref()).await?;
    let books: Vec<BookResponse> = books.iter().map(BookResponse::from).collect();
    Ok(Json(json!({ "books": books })))
}

pub async fn create_book(
    State(state): State<AppState>,
    req: Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let Json(req) = req?;
    let book = state.books.create_book(req.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(&book))))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.books.get_book(book_id(&id)?).await?;
    Ok(Json(BookResponse::from(&book)))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let id = book_id(&id)?;
    let Json(req) = req?;
    let book = state.books.update_book(id, req.into_draft()?).await?;
    Ok(Json(BookResponse::from(&book)))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.books.delete_book(book_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
