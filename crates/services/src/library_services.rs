use std::sync::Arc;

use storage::repository::Storage;

use crate::book_service::BookService;
use crate::error::LibraryServicesError;
use crate::reading_session_service::ReadingSessionService;
use crate::Clock;

/// Assembles the library services over one storage backend.
#[derive(Clone)]
pub struct LibraryServices {
    books: Arc<BookService>,
    reading_sessions: Arc<ReadingSessionService>,
}

impl LibraryServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `LibraryServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, LibraryServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over an already initialized storage backend.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let books = Arc::new(BookService::new(
            Arc::clone(&storage.books),
            Arc::clone(&storage.reading_logs),
        ));
        let reading_sessions = Arc::new(ReadingSessionService::new(
            clock,
            Arc::clone(&storage.books),
            Arc::clone(&storage.reading_logs),
        ));
        Self {
            books,
            reading_sessions,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn books(&self) -> Arc<BookService> {
        Arc::clone(&self.books)
    }

    #[must_use]
    pub fn reading_sessions(&self) -> Arc<ReadingSessionService> {
        Arc::clone(&self.reading_sessions)
    }
}
