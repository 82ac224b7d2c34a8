use async_trait::async_trait;
use chrono::NaiveDate;
use library_core::model::{
    Book, BookId, DateReadingEntry, ReadingLog, ReadingLogError, ReadingLogId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for books.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persist a new book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a book with the same ID, ISBN-10 or
    /// ISBN-13 exists.
    async fn insert_book(&self, book: &Book) -> Result<(), StorageError>;

    /// Replace a stored book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the book does not exist, or
    /// `StorageError::Conflict` if another book carries one of its ISBNs.
    async fn update_book(&self, book: &Book) -> Result<(), StorageError>;

    /// Fetch a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError>;

    /// List books ordered by title, optionally filtered by a case-insensitive
    /// search over title, authors and ISBNs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn list_books(&self, search: Option<&str>) -> Result<Vec<Book>, StorageError>;

    /// Delete a book together with its reading logs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the book does not exist.
    async fn delete_book(&self, id: BookId) -> Result<(), StorageError>;
}

/// Repository contract for reading logs.
///
/// Logs handed out always carry the page count of their book as it is
/// stored right now; the page target itself is never persisted with the log.
#[async_trait]
pub trait ReadingLogRepository: Send + Sync {
    /// Persist a new log with its entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the log ID exists or the book
    /// already has a log, or `StorageError::NotFound` if the book does not exist.
    async fn insert_log(&self, log: &ReadingLog) -> Result<(), StorageError>;

    /// Fetch a log by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn get_log(&self, id: ReadingLogId) -> Result<Option<ReadingLog>, StorageError>;

    /// List all logs for a book.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn list_logs_for_book(&self, book_id: BookId) -> Result<Vec<ReadingLog>, StorageError>;

    /// Set or clear the deadline of a log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log does not exist.
    async fn set_deadline(
        &self,
        id: ReadingLogId,
        deadline: Option<NaiveDate>,
    ) -> Result<(), StorageError>;

    /// Add one dated entry to a log without touching the others.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log does not exist, or
    /// `StorageError::Conflict` if the date already has an entry.
    async fn append_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError>;

    /// Replace the page and bookmark of the entry sharing `entry`'s date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log or the entry does not exist.
    async fn update_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError>;

    /// Remove the entry recorded on `date`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log or the entry does not exist.
    async fn delete_entry(&self, id: ReadingLogId, date: NaiveDate) -> Result<(), StorageError>;

    /// Delete a log and its entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the log does not exist.
    async fn delete_log(&self, id: ReadingLogId) -> Result<(), StorageError>;
}

fn with_book_pages(log: &ReadingLog, book: &Book) -> Result<ReadingLog, StorageError> {
    log.clone()
        .with_total_pages(book.pages())
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    books: Arc<Mutex<HashMap<BookId, Book>>>,
    logs: Arc<Mutex<HashMap<ReadingLogId, ReadingLog>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: Arc::new(Mutex::new(HashMap::new())),
            logs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn books(&self) -> Result<std::sync::MutexGuard<'_, HashMap<BookId, Book>>, StorageError> {
        self.books
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn logs(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ReadingLogId, ReadingLog>>, StorageError> {
        self.logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Applies `edit` to one stored log under the lock.
    fn with_log(
        &self,
        id: ReadingLogId,
        edit: impl FnOnce(&mut ReadingLog) -> Result<(), ReadingLogError>,
    ) -> Result<(), StorageError> {
        let mut logs = self.logs()?;
        let log = logs.get_mut(&id).ok_or(StorageError::NotFound)?;
        edit(log).map_err(|e| match e {
            ReadingLogError::DuplicateDate(_) => StorageError::Conflict,
            ReadingLogError::EntryNotFound(_) => StorageError::NotFound,
            other => StorageError::Serialization(other.to_string()),
        })
    }
}

#[async_trait]
impl BookRepository for InMemoryRepository {
    async fn insert_book(&self, book: &Book) -> Result<(), StorageError> {
        let mut guard = self.books()?;
        if guard.contains_key(&book.id()) || guard.values().any(|b| b.shares_isbn(book)) {
            return Err(StorageError::Conflict);
        }
        guard.insert(book.id(), book.clone());
        Ok(())
    }

    async fn update_book(&self, book: &Book) -> Result<(), StorageError> {
        let mut guard = self.books()?;
        if !guard.contains_key(&book.id()) {
            return Err(StorageError::NotFound);
        }
        if guard
            .values()
            .any(|b| b.id() != book.id() && b.shares_isbn(book))
        {
            return Err(StorageError::Conflict);
        }
        let slot = guard.get_mut(&book.id()).ok_or(StorageError::NotFound)?;
        *slot = book.clone();
        Ok(())
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        Ok(self.books()?.get(&id).cloned())
    }

    async fn list_books(&self, search: Option<&str>) -> Result<Vec<Book>, StorageError> {
        let guard = self.books()?;
        let mut books: Vec<Book> = guard
            .values()
            .filter(|b| search.is_none_or(|s| b.matches(s)))
            .cloned()
            .collect();
        books.sort_by(|a, b| {
            a.title()
                .to_lowercase()
                .cmp(&b.title().to_lowercase())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(books)
    }

    async fn delete_book(&self, id: BookId) -> Result<(), StorageError> {
        let mut books = self.books()?;
        if books.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        self.logs()?.retain(|_, log| log.book_id() != id);
        Ok(())
    }
}

#[async_trait]
impl ReadingLogRepository for InMemoryRepository {
    async fn insert_log(&self, log: &ReadingLog) -> Result<(), StorageError> {
        let books = self.books()?;
        if !books.contains_key(&log.book_id()) {
            return Err(StorageError::NotFound);
        }
        let mut logs = self.logs()?;
        if logs.contains_key(&log.id()) || logs.values().any(|l| l.book_id() == log.book_id()) {
            return Err(StorageError::Conflict);
        }
        logs.insert(log.id(), log.clone());
        Ok(())
    }

    async fn get_log(&self, id: ReadingLogId) -> Result<Option<ReadingLog>, StorageError> {
        let books = self.books()?;
        let logs = self.logs()?;
        let Some(log) = logs.get(&id) else {
            return Ok(None);
        };
        let book = books.get(&log.book_id()).ok_or(StorageError::NotFound)?;
        with_book_pages(log, book).map(Some)
    }

    async fn list_logs_for_book(&self, book_id: BookId) -> Result<Vec<ReadingLog>, StorageError> {
        let books = self.books()?;
        let Some(book) = books.get(&book_id) else {
            return Ok(Vec::new());
        };
        let logs = self.logs()?;
        let mut out = logs
            .values()
            .filter(|log| log.book_id() == book_id)
            .map(|log| with_book_pages(log, book))
            .collect::<Result<Vec<_>, _>>()?;
        out.sort_by_key(ReadingLog::id);
        Ok(out)
    }

    async fn set_deadline(
        &self,
        id: ReadingLogId,
        deadline: Option<NaiveDate>,
    ) -> Result<(), StorageError> {
        self.with_log(id, |log| {
            log.set_deadline(deadline);
            Ok(())
        })
    }

    async fn append_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError> {
        self.with_log(id, |log| log.record_entry(entry.clone()))
    }

    async fn update_entry(
        &self,
        id: ReadingLogId,
        entry: &DateReadingEntry,
    ) -> Result<(), StorageError> {
        self.with_log(id, |log| {
            log.replace_entry(
                entry.date(),
                entry.last_read_page(),
                entry.bookmark().map(str::to_owned),
            )
            .map(|_| ())
        })
    }

    async fn delete_entry(&self, id: ReadingLogId, date: NaiveDate) -> Result<(), StorageError> {
        self.with_log(id, |log| log.remove_entry(date).map(|_| ()))
    }

    async fn delete_log(&self, id: ReadingLogId) -> Result<(), StorageError> {
        self.logs()?
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates book and reading log repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub books: Arc<dyn BookRepository>,
    pub reading_logs: Arc<dyn ReadingLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let books: Arc<dyn BookRepository> = Arc::new(repo.clone());
        let reading_logs: Arc<dyn ReadingLogRepository> = Arc::new(repo);
        Self {
            books,
            reading_logs,
        }
    }
}
