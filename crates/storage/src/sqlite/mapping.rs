use chrono::NaiveDate;
use library_core::model::{Book, BookDraft, BookId, DateReadingEntry, ReadingLogId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps driver errors, surfacing constraint violations as domain outcomes.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn book_id_from_str(v: &str) -> Result<BookId, StorageError> {
    v.parse().map_err(ser)
}

pub(crate) fn log_id_from_str(v: &str) -> Result<ReadingLogId, StorageError> {
    v.parse().map_err(ser)
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn authors_to_json(authors: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(authors).map_err(ser)
}

/// Escapes `LIKE` wildcards and wraps the needle for a substring match.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut out = String::with_capacity(search.len() + 2);
    out.push('%');
    for c in search.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

pub(crate) fn map_book_row(row: &sqlx::sqlite::SqliteRow) -> Result<Book, StorageError> {
    let id = book_id_from_str(row.try_get::<&str, _>("id").map_err(ser)?)?;
    let authors_json: String = row.try_get("authors").map_err(ser)?;
    let authors: Vec<String> = serde_json::from_str(&authors_json).map_err(ser)?;

    BookDraft {
        title: row.try_get("title").map_err(ser)?,
        authors,
        isbn10: row.try_get("isbn10").map_err(ser)?,
        isbn13: row.try_get("isbn13").map_err(ser)?,
        image: row.try_get("image").map_err(ser)?,
        pages: u32_from_i64("pages", row.try_get::<i64, _>("pages").map_err(ser)?)?,
    }
    .validate(id)
    .map_err(ser)
}

pub(crate) fn map_entry_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<DateReadingEntry, StorageError> {
    let date: NaiveDate = row.try_get("date").map_err(ser)?;
    let page = u32_from_i64(
        "last_read_page",
        row.try_get::<i64, _>("last_read_page").map_err(ser)?,
    )?;
    let bookmark: Option<String> = row.try_get("bookmark").map_err(ser)?;
    Ok(DateReadingEntry::new(date, page, bookmark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 100% _Pure_ "), "%100\\% \\_pure\\_%");
    }
}
