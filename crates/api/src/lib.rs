//! HTTP surface of the library: books, reading sessions and progress under `/api/v1`.

#![forbid(unsafe_code)]

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use routes::*;

const SESSION: &str = "/books/{book_id}/reading-sessions/{session_id}";

/// Build the application router with tracing and CORS layers applied.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{book_id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route(
            "/books/{book_id}/reading-sessions",
            get(list_sessions).post(start_session),
        )
        .route(
            "/books/{book_id}/current-reading-session",
            get(current_session),
        )
        .route(
            SESSION,
            get(get_session).patch(update_deadline).delete(delete_session),
        )
        .route(
            &format!("{SESSION}/date-reading-sessions"),
            get(list_entries).post(record_entry),
        )
        .route(
            &format!("{SESSION}/date-reading-sessions/{{date}}"),
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route(&format!("{SESSION}/progress"), get(session_progress))
        .route("/progress", post(compute_progress))
        .route("/health", get(health_check))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
