use chrono::NaiveDate;
use thiserror::Error;

/// Caller-side data integrity problems detected before any projection runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidInput {
    #[error("total pages must be > 0, got {0}")]
    NonPositiveTotalPages(i64),

    #[error("total pages {0} is out of range")]
    TotalPagesOutOfRange(i64),

    #[error("last read page must be >= 0, got {page} on {date}")]
    NegativeLastReadPage { date: NaiveDate, page: i64 },

    #[error("last read page {page} on {date} is out of range")]
    PageOutOfRange { date: NaiveDate, page: i64 },

    #[error("invalid {field}: {raw}")]
    InvalidIdentifier { field: &'static str, raw: String },
}
