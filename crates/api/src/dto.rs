//! Request and response bodies for the book endpoints and query strings.
//!
//! Reading sessions, entries and progress reuse the shapes in `library_core::wire`.

use chrono::NaiveDate;
use library_core::model::{Book, BookDraft};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub isbn10: Option<String>,
    #[serde(default)]
    pub isbn13: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub pages: i64,
}

impl BookRequest {
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if `pages` is not a positive page count.
    pub fn into_draft(self) -> Result<BookDraft, ApiError> {
        let pages = u32::try_from(self.pages)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| ApiError::BadRequest(format!("pages must be > 0, got {}", self.pages)))?;
        Ok(BookDraft {
            title: self.title,
            authors: self.authors,
            isbn10: self.isbn10,
            isbn13: self.isbn13,
            image: self.image,
            pages,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub uuid: String,
    pub title: String,
    pub authors: Vec<String>,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub image: Option<String>,
    pub pages: u32,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            uuid: book.id().to_string(),
            title: book.title().to_owned(),
            authors: book.authors().to_vec(),
            isbn10: book.isbn10().map(str::to_owned),
            isbn13: book.isbn13().map(str::to_owned),
            image: book.image().map(str::to_owned),
            pages: book.pages(),
        }
    }
}

/// Body for starting a session or changing its deadline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineRequest {
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Body for correcting an entry; the date comes from the path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpdateRequest {
    pub last_read_page: i64,
    #[serde(default)]
    pub bookmark: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressQuery {
    pub today: Option<NaiveDate>,
}
