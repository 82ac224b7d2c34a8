use std::sync::Arc;

use library_core::model::{Book, BookDraft, BookId};
use storage::repository::{BookRepository, ReadingLogRepository, StorageError};
use tracing::{debug, warn};

use crate::error::BookServiceError;

/// Orchestrates book validation and persistence.
#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn BookRepository>,
    logs: Arc<dyn ReadingLogRepository>,
}

impl BookService {
    #[must_use]
    pub fn new(books: Arc<dyn BookRepository>, logs: Arc<dyn ReadingLogRepository>) -> Self {
        Self { books, logs }
    }

    /// List books ordered by title, optionally filtered by `search`.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Storage` if repository access fails.
    pub async fn list_books(&self, search: Option<&str>) -> Result<Vec<Book>, BookServiceError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.books.list_books(search).await?)
    }

    /// Validate and persist a new book.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::Book` for validation failures.
    /// Returns `BookServiceError::IsbnExists` if another book carries the same ISBN.
    /// Returns `BookServiceError::Storage` if persistence fails.
    pub async fn create_book(&self, draft: BookDraft) -> Result<Book, BookServiceError> {
        let book = draft.validate(BookId::generate())?;
        self.ensure_unique_isbn(&book).await?;
        self.books.insert_book(&book).await.map_err(write_err)?;
        debug!(book_id = %book.id(), title = book.title(), "book created");
        Ok(book)
    }

    /// Fetch a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::NotFound` if the book does not exist.
    /// Returns `BookServiceError::Storage` if repository access fails.
    pub async fn get_book(&self, id: BookId) -> Result<Book, BookServiceError> {
        self.books
            .get_book(id)
            .await?
            .ok_or(BookServiceError::NotFound)
    }

    /// Replace the fields of an existing book.
    ///
    /// Reading logs of the book pick up a changed page count on their next read.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::NotFound` if the book does not exist.
    /// Returns `BookServiceError::Book` for validation failures.
    /// Returns `BookServiceError::IsbnExists` if another book carries the same ISBN.
    /// Returns `BookServiceError::Storage` if persistence fails.
    pub async fn update_book(&self, id: BookId, draft: BookDraft) -> Result<Book, BookServiceError> {
        let current = self.get_book(id).await?;
        let book = draft.validate(current.id())?;
        self.ensure_unique_isbn(&book).await?;
        self.books.update_book(&book).await.map_err(write_err)?;
        if book.pages() != current.pages() {
            debug!(
                book_id = %id,
                from = current.pages(),
                to = book.pages(),
                "book page count changed"
            );
        }
        Ok(book)
    }

    /// Delete a book that has no recorded reading entries.
    ///
    /// Empty reading sessions are removed with the book.
    ///
    /// # Errors
    ///
    /// Returns `BookServiceError::NotFound` if the book does not exist.
    /// Returns `BookServiceError::HasReadingEntries` if any session has entries.
    /// Returns `BookServiceError::Storage` if persistence fails.
    pub async fn delete_book(&self, id: BookId) -> Result<(), BookServiceError> {
        let book = self.get_book(id).await?;
        let logs = self.logs.list_logs_for_book(book.id()).await?;
        if logs.iter().any(|log| !log.is_empty()) {
            warn!(book_id = %id, "refusing to delete book with reading entries");
            return Err(BookServiceError::HasReadingEntries);
        }
        self.books.delete_book(id).await.map_err(not_found)?;
        debug!(book_id = %id, "book deleted");
        Ok(())
    }

    async fn ensure_unique_isbn(&self, book: &Book) -> Result<(), BookServiceError> {
        if book.isbn10().is_none() && book.isbn13().is_none() {
            return Ok(());
        }
        let existing = self.books.list_books(None).await?;
        if existing
            .iter()
            .any(|other| other.id() != book.id() && other.shares_isbn(book))
        {
            return Err(BookServiceError::IsbnExists);
        }
        Ok(())
    }
}

/// The store rejects a twin ISBN that slipped past `ensure_unique_isbn`.
fn write_err(err: StorageError) -> BookServiceError {
    match err {
        StorageError::Conflict => BookServiceError::IsbnExists,
        other => not_found(other),
    }
}

fn not_found(err: StorageError) -> BookServiceError {
    match err {
        StorageError::NotFound => BookServiceError::NotFound,
        other => BookServiceError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use library_core::model::{DateReadingEntry, ReadingLog, ReadingLogId};
    use library_core::model::BookError;
    use storage::repository::InMemoryRepository;

    fn service() -> (BookService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let service = BookService::new(Arc::new(repo.clone()), Arc::new(repo.clone()));
        (service, repo)
    }

    fn draft(title: &str, isbn13: Option<&str>) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            authors: vec!["Ursula K. Le Guin".to_string()],
            isbn13: isbn13.map(str::to_string),
            pages: 250,
            ..BookDraft::default()
        }
    }

    #[tokio::test]
    async fn create_book_persists_validated_book() {
        let (service, _) = service();
        let book = service
            .create_book(draft("  The Dispossessed  ", None))
            .await
            .unwrap();
        assert_eq!(book.title(), "The Dispossessed");
        assert_eq!(service.get_book(book.id()).await.unwrap(), book);
    }

    #[tokio::test]
    async fn create_book_rejects_invalid_draft() {
        let (service, _) = service();
        let mut bad = draft("Lathe of Heaven", None);
        bad.pages = 0;
        let err = service.create_book(bad).await.unwrap_err();
        assert!(matches!(err, BookServiceError::Book(BookError::InvalidPages)));
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let (service, _) = service();
        service
            .create_book(draft("Earthsea", Some("9780547773742")))
            .await
            .unwrap();
        let err = service
            .create_book(draft("A Wizard of Earthsea", Some("9780547773742")))
            .await
            .unwrap_err();
        assert!(matches!(err, BookServiceError::IsbnExists));
    }

    #[tokio::test]
    async fn update_keeps_own_isbn() {
        let (service, _) = service();
        let book = service
            .create_book(draft("Earthsea", Some("9780547773742")))
            .await
            .unwrap();
        let mut changed = book.to_draft();
        changed.pages = 300;
        let updated = service.update_book(book.id(), changed).await.unwrap();
        assert_eq!(updated.pages(), 300);
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let (service, _) = service();
        let id = BookId::generate();
        assert!(matches!(
            service.get_book(id).await,
            Err(BookServiceError::NotFound)
        ));
        assert!(matches!(
            service.update_book(id, draft("x", None)).await,
            Err(BookServiceError::NotFound)
        ));
        assert!(matches!(
            service.delete_book(id).await,
            Err(BookServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_blocked_by_recorded_entries() {
        let (service, repo) = service();
        let book = service.create_book(draft("Tehanu", None)).await.unwrap();
        let mut log = ReadingLog::new(ReadingLogId::generate(), book.id(), 250, None).unwrap();
        log.record_entry(DateReadingEntry::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            10,
            None,
        ))
        .unwrap();
        repo.insert_log(&log).await.unwrap();

        let err = service.delete_book(book.id()).await.unwrap_err();
        assert!(matches!(err, BookServiceError::HasReadingEntries));

        repo.delete_entry(log.id(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .unwrap();
        service.delete_book(book.id()).await.unwrap();
        assert!(repo.get_log(log.id()).await.unwrap().is_none());
    }

    struct UnavailableBooks;

    #[async_trait::async_trait]
    impl BookRepository for UnavailableBooks {
        async fn insert_book(&self, _book: &Book) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
        async fn update_book(&self, _book: &Book) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
        async fn get_book(&self, _id: BookId) -> Result<Option<Book>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
        async fn list_books(&self, _search: Option<&str>) -> Result<Vec<Book>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
        async fn delete_book(&self, _id: BookId) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[tokio::test]
    async fn backend_failures_surface_as_storage_errors() {
        let service = BookService::new(
            Arc::new(UnavailableBooks),
            Arc::new(InMemoryRepository::new()),
        );
        assert!(matches!(
            service.get_book(BookId::generate()).await,
            Err(BookServiceError::Storage(StorageError::Connection(_)))
        ));
        assert!(matches!(
            service.create_book(draft("Tehanu", Some("9780689317279"))).await,
            Err(BookServiceError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn list_books_ignores_blank_search() {
        let (service, _) = service();
        service.create_book(draft("Tehanu", None)).await.unwrap();
        service.create_book(draft("Tales", None)).await.unwrap();
        assert_eq!(service.list_books(Some("   ")).await.unwrap().len(), 2);
        assert_eq!(service.list_books(Some("teh")).await.unwrap().len(), 1);
    }
}
