pub mod books;
pub mod health;
pub mod progress;
pub mod reading_sessions;

pub use books::*;
pub use health::*;
pub use progress::*;
pub use reading_sessions::*;

use chrono::NaiveDate;
use library_core::model::{BookId, ReadingLogId};

use crate::error::ApiError;

fn book_id(raw: &str) -> Result<BookId, ApiError> {
    Ok(raw.parse()?)
}

fn session_id(raw: &str) -> Result<ReadingLogId, ApiError> {
    Ok(raw.parse()?)
}

fn entry_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date: {raw}")))
}
