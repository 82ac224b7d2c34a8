use std::sync::Arc;

use chrono::NaiveDate;
use library_core::model::{
    Book, BookId, DateReadingEntry, ReadingLog, ReadingLogError, ReadingLogId,
};
use library_core::{progress, ReadingProgress};
use storage::repository::{BookRepository, ReadingLogRepository, StorageError};
use tracing::{debug, warn};

use crate::error::ReadingSessionError;
use crate::Clock;

/// Manages the reading session of a book and the dated entries recorded in it.
#[derive(Clone)]
pub struct ReadingSessionService {
    clock: Clock,
    books: Arc<dyn BookRepository>,
    logs: Arc<dyn ReadingLogRepository>,
}

impl ReadingSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        books: Arc<dyn BookRepository>,
        logs: Arc<dyn ReadingLogRepository>,
    ) -> Self {
        Self { clock, books, logs }
    }

    /// List the reading sessions of a book.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::BookNotFound` if the book does not exist.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn list_sessions(
        &self,
        book_id: BookId,
    ) -> Result<Vec<ReadingLog>, ReadingSessionError> {
        self.require_book(book_id).await?;
        Ok(self.logs.list_logs_for_book(book_id).await?)
    }

    /// Fetch the session currently attached to a book.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::BookNotFound` if the book does not exist.
    /// Returns `ReadingSessionError::SessionNotFound` if no session was started.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn current_session(&self, book_id: BookId) -> Result<ReadingLog, ReadingSessionError> {
        self.list_sessions(book_id)
            .await?
            .into_iter()
            .next()
            .ok_or(ReadingSessionError::SessionNotFound)
    }

    /// Start an empty reading session for a book.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::BookNotFound` if the book does not exist.
    /// Returns `ReadingSessionError::SessionExists` if the book already has one.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn start_session(
        &self,
        book_id: BookId,
        deadline: Option<NaiveDate>,
    ) -> Result<ReadingLog, ReadingSessionError> {
        let book = self.require_book(book_id).await?;
        if !self.logs.list_logs_for_book(book_id).await?.is_empty() {
            warn!(book_id = %book_id, "reading session already exists");
            return Err(ReadingSessionError::SessionExists);
        }
        let log = ReadingLog::new(ReadingLogId::generate(), book.id(), book.pages(), deadline)?;
        self.logs.insert_log(&log).await.map_err(|err| match err {
            StorageError::NotFound => ReadingSessionError::BookNotFound,
            StorageError::Conflict => ReadingSessionError::SessionExists,
            other => ReadingSessionError::Storage(other),
        })?;
        debug!(book_id = %book_id, session_id = %log.id(), ?deadline, "reading session started");
        Ok(log)
    }

    /// Fetch a session of a book.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not
    /// exist or belongs to another book.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn get_session(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
    ) -> Result<ReadingLog, ReadingSessionError> {
        self.logs
            .get_log(session_id)
            .await?
            .filter(|log| log.book_id() == book_id)
            .ok_or(ReadingSessionError::SessionNotFound)
    }

    /// Delete a session and all of its entries.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn delete_session(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
    ) -> Result<(), ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        self.logs
            .delete_log(log.id())
            .await
            .map_err(session_not_found)?;
        debug!(book_id = %book_id, session_id = %session_id, "reading session deleted");
        Ok(())
    }

    /// Set or clear the deadline of a session.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn update_deadline(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
        deadline: Option<NaiveDate>,
    ) -> Result<ReadingLog, ReadingSessionError> {
        let mut log = self.get_session(book_id, session_id).await?;
        self.logs
            .set_deadline(log.id(), deadline)
            .await
            .map_err(session_not_found)?;
        log.set_deadline(deadline);
        debug!(session_id = %session_id, ?deadline, "reading deadline updated");
        Ok(log)
    }

    /// List the entries of a session in date order.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn list_entries(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
    ) -> Result<Vec<DateReadingEntry>, ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        Ok(log.entries().to_vec())
    }

    /// Record the page reached on a day.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Log` if the day already has an entry.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn record_entry(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
        entry: DateReadingEntry,
    ) -> Result<DateReadingEntry, ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        let date = entry.date();
        self.logs
            .append_entry(log.id(), &entry)
            .await
            .map_err(|err| match err {
                StorageError::Conflict => {
                    warn!(session_id = %session_id, date = %date, "entry rejected: date already recorded");
                    ReadingLogError::DuplicateDate(date).into()
                }
                other => session_not_found(other),
            })?;
        debug!(
            session_id = %session_id,
            date = %entry.date(),
            page = entry.last_read_page(),
            "reading entry recorded"
        );
        Ok(entry)
    }

    /// Fetch the entry recorded on `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Log` if nothing is recorded for `date`.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn get_entry(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
        date: NaiveDate,
    ) -> Result<DateReadingEntry, ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        log.entry(date)
            .cloned()
            .ok_or(ReadingLogError::EntryNotFound(date).into())
    }

    /// Correct the page and bookmark recorded on `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Log` if nothing is recorded for `date`.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn update_entry(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
        date: NaiveDate,
        last_read_page: u32,
        bookmark: Option<String>,
    ) -> Result<DateReadingEntry, ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        let entry = DateReadingEntry::new(date, last_read_page, bookmark);
        self.logs
            .update_entry(log.id(), &entry)
            .await
            .map_err(|err| entry_not_found(err, date))?;
        debug!(session_id = %session_id, date = %date, page = last_read_page, "reading entry updated");
        Ok(entry)
    }

    /// Remove the entry recorded on `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Log` if nothing is recorded for `date`.
    /// Returns `ReadingSessionError::Storage` if persistence fails.
    pub async fn delete_entry(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
        date: NaiveDate,
    ) -> Result<(), ReadingSessionError> {
        let log = self.get_session(book_id, session_id).await?;
        self.logs
            .delete_entry(log.id(), date)
            .await
            .map_err(|err| entry_not_found(err, date))?;
        debug!(session_id = %session_id, date = %date, "reading entry deleted");
        Ok(())
    }

    /// Project the session as of the clock's current day.
    ///
    /// # Errors
    ///
    /// Returns `ReadingSessionError::BookNotFound` if the book does not exist.
    /// Returns `ReadingSessionError::SessionNotFound` if the session does not exist.
    /// Returns `ReadingSessionError::Storage` if repository access fails.
    pub async fn progress(
        &self,
        book_id: BookId,
        session_id: ReadingLogId,
    ) -> Result<ReadingProgress, ReadingSessionError> {
        let book = self.require_book(book_id).await?;
        let log = self.get_session(book_id, session_id).await?;
        let log = log.with_total_pages(book.pages())?;
        let today = self.clock.today();
        let progress = progress::compute(&log, today);
        debug!(
            session_id = %session_id,
            %today,
            percentage = progress.read_percentage,
            projection = ?progress.projection,
            "reading progress computed"
        );
        Ok(progress)
    }

    async fn require_book(&self, book_id: BookId) -> Result<Book, ReadingSessionError> {
        self.books
            .get_book(book_id)
            .await?
            .ok_or(ReadingSessionError::BookNotFound)
    }
}

fn entry_not_found(err: StorageError, date: NaiveDate) -> ReadingSessionError {
    match err {
        StorageError::NotFound => ReadingLogError::EntryNotFound(date).into(),
        other => ReadingSessionError::Storage(other),
    }
}

fn session_not_found(err: StorageError) -> ReadingSessionError {
    match err {
        StorageError::NotFound => ReadingSessionError::SessionNotFound,
        other => ReadingSessionError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use library_core::model::BookDraft;
    use library_core::time::fixed_today;
    use library_core::{DeadlineStatus, Projection};
    use storage::repository::InMemoryRepository;

    fn day(offset: i64) -> NaiveDate {
        fixed_today() + chrono::Duration::days(offset)
    }

    async fn setup(pages: u32) -> (ReadingSessionService, InMemoryRepository, Book) {
        let repo = InMemoryRepository::new();
        let book = BookDraft {
            title: "Piranesi".to_string(),
            pages,
            ..BookDraft::default()
        }
        .validate(BookId::generate())
        .unwrap();
        repo.insert_book(&book).await.unwrap();
        let service = ReadingSessionService::new(
            Clock::fixed_on(fixed_today()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        (service, repo, book)
    }

    #[tokio::test]
    async fn start_session_is_empty_and_unique() {
        let (service, _, book) = setup(300).await;
        let log = service.start_session(book.id(), Some(day(10))).await.unwrap();
        assert!(log.is_empty());
        assert_eq!(log.total_pages(), 300);
        assert_eq!(log.deadline(), Some(day(10)));

        let err = service.start_session(book.id(), None).await.unwrap_err();
        assert!(matches!(err, ReadingSessionError::SessionExists));

        let current = service.current_session(book.id()).await.unwrap();
        assert_eq!(current.id(), log.id());
    }

    #[tokio::test]
    async fn unknown_book_and_session_are_reported() {
        let (service, _, book) = setup(300).await;
        let ghost = BookId::generate();
        assert!(matches!(
            service.start_session(ghost, None).await,
            Err(ReadingSessionError::BookNotFound)
        ));
        assert!(matches!(
            service.current_session(book.id()).await,
            Err(ReadingSessionError::SessionNotFound)
        ));
        assert!(matches!(
            service.get_session(book.id(), ReadingLogId::generate()).await,
            Err(ReadingSessionError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn session_of_another_book_is_hidden() {
        let (service, repo, book) = setup(300).await;
        let other = BookDraft {
            title: "Jonathan Strange".to_string(),
            pages: 800,
            ..BookDraft::default()
        }
        .validate(BookId::generate())
        .unwrap();
        repo.insert_book(&other).await.unwrap();
        let log = service.start_session(book.id(), None).await.unwrap();

        assert!(matches!(
            service.get_session(other.id(), log.id()).await,
            Err(ReadingSessionError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn entries_are_recorded_corrected_and_removed() {
        let (service, _, book) = setup(300).await;
        let log = service.start_session(book.id(), None).await.unwrap();

        service
            .record_entry(book.id(), log.id(), DateReadingEntry::new(day(-2), 40, None))
            .await
            .unwrap();
        service
            .record_entry(book.id(), log.id(), DateReadingEntry::new(day(-5), 10, None))
            .await
            .unwrap();
        let dup = service
            .record_entry(book.id(), log.id(), DateReadingEntry::new(day(-2), 45, None))
            .await
            .unwrap_err();
        assert!(matches!(
            dup,
            ReadingSessionError::Log(ReadingLogError::DuplicateDate(_))
        ));

        let dates: Vec<_> = service
            .list_entries(book.id(), log.id())
            .await
            .unwrap()
            .iter()
            .map(DateReadingEntry::date)
            .collect();
        assert_eq!(dates, vec![day(-5), day(-2)]);

        let updated = service
            .update_entry(book.id(), log.id(), day(-2), 50, Some("chapter 4".into()))
            .await
            .unwrap();
        assert_eq!(updated.last_read_page(), 50);
        let fetched = service.get_entry(book.id(), log.id(), day(-2)).await.unwrap();
        assert_eq!(fetched.bookmark(), Some("chapter 4"));

        service.delete_entry(book.id(), log.id(), day(-5)).await.unwrap();
        assert!(matches!(
            service.get_entry(book.id(), log.id(), day(-5)).await,
            Err(ReadingSessionError::Log(ReadingLogError::EntryNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn progress_uses_clock_and_current_book_pages() {
        let (service, repo, book) = setup(300).await;
        let log = service.start_session(book.id(), Some(day(20))).await.unwrap();
        service
            .record_entry(book.id(), log.id(), DateReadingEntry::new(day(-10), 20, None))
            .await
            .unwrap();
        service
            .record_entry(book.id(), log.id(), DateReadingEntry::new(day(0), 120, None))
            .await
            .unwrap();

        let progress = service.progress(book.id(), log.id()).await.unwrap();
        assert_eq!(progress.read_percentage, 40);
        assert_eq!(progress.average_pages_per_day, 12);
        assert_eq!(progress.estimated_read_days_left, Some(15));
        assert_eq!(progress.estimated_days_left, Some(20));
        assert_eq!(progress.projection, Projection::OnPace);
        assert_eq!(progress.deadline_status, DeadlineStatus::OnTrack);

        let mut draft = book.to_draft();
        draft.pages = 120;
        repo.update_book(&draft.validate(book.id()).unwrap())
            .await
            .unwrap();
        let progress = service.progress(book.id(), log.id()).await.unwrap();
        assert_eq!(progress.read_percentage, 100);
        assert_eq!(progress.projection, Projection::Finished);
        assert_eq!(progress.deadline_status, DeadlineStatus::Met);
    }

    #[tokio::test]
    async fn deadline_can_be_cleared() {
        let (service, _, book) = setup(300).await;
        let log = service.start_session(book.id(), Some(day(3))).await.unwrap();
        let updated = service
            .update_deadline(book.id(), log.id(), None)
            .await
            .unwrap();
        assert_eq!(updated.deadline(), None);
        let progress = service.progress(book.id(), log.id()).await.unwrap();
        assert_eq!(progress.deadline_status, DeadlineStatus::NoDeadline);
        assert_eq!(progress.projection, Projection::NoEntries);
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let (service, _, book) = setup(300).await;
        let log = service.start_session(book.id(), None).await.unwrap();
        service.delete_session(book.id(), log.id()).await.unwrap();
        assert!(service.list_sessions(book.id()).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_session(book.id(), log.id()).await,
            Err(ReadingSessionError::SessionNotFound)
        ));
    }
}
