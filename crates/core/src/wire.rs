//! JSON shapes exchanged with callers of the progress calculator.
//!
//! Field names are camelCase and dates are ISO `YYYY-MM-DD` strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::model::{BookId, DateReadingEntry, ReadingLog, ReadingLogId};
use crate::progress::{self, DeadlineStatus, Projection, ReadingProgress};

/// One dated observation as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateReadingEntryPayload {
    pub date: NaiveDate,
    pub last_read_page: i64,
    #[serde(default)]
    pub bookmark: Option<String>,
}

impl DateReadingEntryPayload {
    /// # Errors
    ///
    /// Returns `InvalidInput` if the page is negative or does not fit a page index.
    pub fn into_entry(self) -> Result<DateReadingEntry, InvalidInput> {
        if self.last_read_page < 0 {
            return Err(InvalidInput::NegativeLastReadPage {
                date: self.date,
                page: self.last_read_page,
            });
        }
        let page = u32::try_from(self.last_read_page).map_err(|_| InvalidInput::PageOutOfRange {
            date: self.date,
            page: self.last_read_page,
        })?;
        Ok(DateReadingEntry::new(self.date, page, self.bookmark))
    }
}

impl From<&DateReadingEntry> for DateReadingEntryPayload {
    fn from(entry: &DateReadingEntry) -> Self {
        Self {
            date: entry.date(),
            last_read_page: i64::from(entry.last_read_page()),
            bookmark: entry.bookmark().map(str::to_owned),
        }
    }
}

/// A full reading log snapshot as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingLogPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub book_uuid: String,
    pub total_pages: i64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub date_reading_sessions: Vec<DateReadingEntryPayload>,
}

impl TryFrom<ReadingLogPayload> for ReadingLog {
    type Error = InvalidInput;

    fn try_from(payload: ReadingLogPayload) -> Result<Self, Self::Error> {
        if payload.total_pages <= 0 {
            return Err(InvalidInput::NonPositiveTotalPages(payload.total_pages));
        }
        let total_pages = u32::try_from(payload.total_pages)
            .map_err(|_| InvalidInput::TotalPagesOutOfRange(payload.total_pages))?;

        let book_id: BookId = payload
            .book_uuid
            .parse()
            .map_err(|_| InvalidInput::InvalidIdentifier {
                field: "bookUuid",
                raw: payload.book_uuid.clone(),
            })?;
        let id = match payload.uuid {
            Some(raw) => raw
                .parse::<ReadingLogId>()
                .map_err(|_| InvalidInput::InvalidIdentifier { field: "uuid", raw })?,
            None => ReadingLogId::detached(),
        };

        let entries = payload
            .date_reading_sessions
            .into_iter()
            .map(DateReadingEntryPayload::into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        ReadingLog::from_persisted(id, book_id, total_pages, payload.deadline, entries)
            .map_err(|_| InvalidInput::NonPositiveTotalPages(payload.total_pages))
    }
}

impl From<&ReadingLog> for ReadingLogPayload {
    fn from(log: &ReadingLog) -> Self {
        Self {
            uuid: Some(log.id().to_string()),
            book_uuid: log.book_id().to_string(),
            total_pages: i64::from(log.total_pages()),
            deadline: log.deadline(),
            date_reading_sessions: log.entries().iter().map(Into::into).collect(),
        }
    }
}

/// Serialized projection returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgressPayload {
    pub book_uuid: String,
    pub last_read_page: u32,
    pub pages_total: u32,
    pub read_percentage: u8,
    pub average_pages_per_day: u32,
    pub estimated_read_days_left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_days_left: Option<i64>,
    pub estimated_finish_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub projection: Projection,
    pub deadline_status: DeadlineStatus,
}

impl From<&ReadingProgress> for ReadingProgressPayload {
    fn from(p: &ReadingProgress) -> Self {
        Self {
            book_uuid: p.book_id.to_string(),
            last_read_page: p.last_read_page,
            pages_total: p.pages_total,
            read_percentage: p.read_percentage,
            average_pages_per_day: p.average_pages_per_day,
            estimated_read_days_left: p.estimated_read_days_left,
            estimated_days_left: p.estimated_days_left,
            estimated_finish_date: p.estimated_finish_date,
            deadline: p.deadline,
            projection: p.projection,
            deadline_status: p.deadline_status,
        }
    }
}

/// Validate an untyped log and project it as of `today`.
///
/// # Errors
///
/// Returns `InvalidInput` when the payload violates the log's integrity rules;
/// no partial result is produced.
pub fn compute_payload(
    payload: ReadingLogPayload,
    today: NaiveDate,
) -> Result<ReadingProgressPayload, InvalidInput> {
    let log = ReadingLog::try_from(payload)?;
    Ok((&progress::compute(&log, today)).into())
}
