//! Shared error types for the services crate.

use thiserror::Error;

use library_core::model::{BookError, ReadingLogError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `BookService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BookServiceError {
    #[error("book not found")]
    NotFound,
    #[error("a book with the same ISBN already exists")]
    IsbnExists,
    #[error("book still has recorded reading entries")]
    HasReadingEntries,
    #[error(transparent)]
    Book(#[from] BookError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReadingSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadingSessionError {
    #[error("book not found")]
    BookNotFound,
    #[error("reading session not found")]
    SessionNotFound,
    #[error("book already has a reading session")]
    SessionExists,
    #[error(transparent)]
    Log(#[from] ReadingLogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping library services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
