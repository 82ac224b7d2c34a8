use std::sync::Arc;

use services::{BookService, Clock, LibraryServices, ReadingSessionService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<BookService>,
    pub reading_sessions: Arc<ReadingSessionService>,
    pub clock: Clock,
}

impl AppState {
    #[must_use]
    pub fn new(services: &LibraryServices, clock: Clock) -> Self {
        Self {
            books: services.books(),
            reading_sessions: services.reading_sessions(),
            clock,
        }
    }
}
