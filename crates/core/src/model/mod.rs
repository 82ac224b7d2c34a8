mod book;
mod ids;
mod reading;

pub use ids::{BookId, ParseIdError, ReadingLogId};

pub use book::{Book, BookDraft, BookError};
pub use reading::{DateReadingEntry, ReadingLog, ReadingLogError};
