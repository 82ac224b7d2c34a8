use thiserror::Error;

use crate::model::ids::BookId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookError {
    #[error("book title cannot be empty")]
    EmptyTitle,

    #[error("book page count must be > 0")]
    InvalidPages,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated book fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub authors: Vec<String>,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub image: Option<String>,
    pub pages: u32,
}

impl BookDraft {
    /// Validate the draft and attach an identifier.
    ///
    /// # Errors
    ///
    /// Returns `BookError::EmptyTitle` if the title is blank.
    /// Returns `BookError::InvalidPages` if `pages` is zero.
    pub fn validate(self, id: BookId) -> Result<Book, BookError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(BookError::EmptyTitle);
        }
        if self.pages == 0 {
            return Err(BookError::InvalidPages);
        }

        Ok(Book {
            id,
            title,
            authors: self
                .authors
                .into_iter()
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty())
                .collect(),
            isbn10: non_blank(self.isbn10),
            isbn13: non_blank(self.isbn13),
            image: non_blank(self.image),
            pages: self.pages,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

//
// ─── BOOK ──────────────────────────────────────────────────────────────────────
//

/// A book in the personal library.
///
/// The page count is the completion target for every reading log of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: String,
    authors: Vec<String>,
    isbn10: Option<String>,
    isbn13: Option<String>,
    image: Option<String>,
    pages: u32,
}

impl Book {
    /// Build a validated book.
    ///
    /// # Errors
    ///
    /// See [`BookDraft::validate`].
    pub fn new(id: BookId, draft: BookDraft) -> Result<Self, BookError> {
        draft.validate(id)
    }

    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    #[must_use]
    pub fn isbn10(&self) -> Option<&str> {
        self.isbn10.as_deref()
    }

    #[must_use]
    pub fn isbn13(&self) -> Option<&str> {
        self.isbn13.as_deref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Returns the fields of this book as an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            authors: self.authors.clone(),
            isbn10: self.isbn10.clone(),
            isbn13: self.isbn13.clone(),
            image: self.image.clone(),
            pages: self.pages,
        }
    }

    /// True when both books carry the same ISBN-10 or the same ISBN-13.
    #[must_use]
    pub fn shares_isbn(&self, other: &Book) -> bool {
        let same = |a: Option<&str>, b: Option<&str>| matches!((a, b), (Some(a), Some(b)) if a == b);
        same(self.isbn10(), other.isbn10()) || same(self.isbn13(), other.isbn13())
    }

    /// Case-insensitive match against title, authors and ISBNs.
    ///
    /// A blank search matches every book.
    #[must_use]
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        std::iter::once(self.title.as_str())
            .chain(self.authors.iter().map(String::as_str))
            .chain(self.isbn10.as_deref())
            .chain(self.isbn13.as_deref())
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
