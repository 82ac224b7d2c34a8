use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ids::{BookId, ReadingLogId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadingLogError {
    #[error("total pages must be > 0")]
    InvalidTotalPages,

    #[error("an entry for {0} is already recorded")]
    DuplicateDate(NaiveDate),

    #[error("no entry recorded for {0}")]
    EntryNotFound(NaiveDate),
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// A single dated observation of reading progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateReadingEntry {
    date: NaiveDate,
    last_read_page: u32,
    bookmark: Option<String>,
}

impl DateReadingEntry {
    /// A blank bookmark is stored as `None`.
    #[must_use]
    pub fn new(date: NaiveDate, last_read_page: u32, bookmark: Option<String>) -> Self {
        Self {
            date,
            last_read_page,
            bookmark: bookmark
                .map(|b| b.trim().to_owned())
                .filter(|b| !b.is_empty()),
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn last_read_page(&self) -> u32 {
        self.last_read_page
    }

    #[must_use]
    pub fn bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref()
    }
}

//
// ─── LOG ───────────────────────────────────────────────────────────────────────
//

/// The dated reading history of one book, plus its page target and optional deadline.
///
/// Entries are kept in chronological order no matter the order they were
/// recorded in. Page numbers are not required to grow: a regression is kept
/// as-is and shows up as lower progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingLog {
    id: ReadingLogId,
    book_id: BookId,
    total_pages: u32,
    deadline: Option<NaiveDate>,
    entries: Vec<DateReadingEntry>,
}

impl ReadingLog {
    /// Start a new, empty reading log.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::InvalidTotalPages` if `total_pages` is zero.
    pub fn new(
        id: ReadingLogId,
        book_id: BookId,
        total_pages: u32,
        deadline: Option<NaiveDate>,
    ) -> Result<Self, ReadingLogError> {
        Self::from_persisted(id, book_id, total_pages, deadline, Vec::new())
    }

    /// Rehydrate a log from storage or the wire.
    ///
    /// Entries are sorted by date; entries sharing a date keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::InvalidTotalPages` if `total_pages` is zero.
    pub fn from_persisted(
        id: ReadingLogId,
        book_id: BookId,
        total_pages: u32,
        deadline: Option<NaiveDate>,
        mut entries: Vec<DateReadingEntry>,
    ) -> Result<Self, ReadingLogError> {
        if total_pages == 0 {
            return Err(ReadingLogError::InvalidTotalPages);
        }
        entries.sort_by_key(DateReadingEntry::date);
        Ok(Self {
            id,
            book_id,
            total_pages,
            deadline,
            entries,
        })
    }

    #[must_use]
    pub fn id(&self) -> ReadingLogId {
        self.id
    }

    #[must_use]
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    #[must_use]
    pub fn entries(&self) -> &[DateReadingEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn first_entry(&self) -> Option<&DateReadingEntry> {
        self.entries.first()
    }

    #[must_use]
    pub fn last_entry(&self) -> Option<&DateReadingEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn entry(&self, date: NaiveDate) -> Option<&DateReadingEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Returns this log with its page target taken from the owning book.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::InvalidTotalPages` if `total_pages` is zero.
    pub fn with_total_pages(mut self, total_pages: u32) -> Result<Self, ReadingLogError> {
        if total_pages == 0 {
            return Err(ReadingLogError::InvalidTotalPages);
        }
        self.total_pages = total_pages;
        Ok(self)
    }

    pub fn set_deadline(&mut self, deadline: Option<NaiveDate>) {
        self.deadline = deadline;
    }

    /// Record a new observation at its chronological position.
    ///
    /// Back-dated entries are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::DuplicateDate` if the date already has an entry.
    pub fn record_entry(&mut self, entry: DateReadingEntry) -> Result<(), ReadingLogError> {
        match self.entries.binary_search_by_key(&entry.date, DateReadingEntry::date) {
            Ok(_) => Err(ReadingLogError::DuplicateDate(entry.date)),
            Err(pos) => {
                self.entries.insert(pos, entry);
                Ok(())
            }
        }
    }

    /// Correct the page and bookmark recorded for `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::EntryNotFound` if nothing is recorded for `date`.
    pub fn replace_entry(
        &mut self,
        date: NaiveDate,
        last_read_page: u32,
        bookmark: Option<String>,
    ) -> Result<&DateReadingEntry, ReadingLogError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.date == date)
            .ok_or(ReadingLogError::EntryNotFound(date))?;
        *slot = DateReadingEntry::new(date, last_read_page, bookmark);
        Ok(&*slot)
    }

    /// Remove the entry recorded for `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReadingLogError::EntryNotFound` if nothing is recorded for `date`.
    pub fn remove_entry(&mut self, date: NaiveDate) -> Result<DateReadingEntry, ReadingLogError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.date == date)
            .ok_or(ReadingLogError::EntryNotFound(date))?;
        Ok(self.entries.remove(pos))
    }
}
