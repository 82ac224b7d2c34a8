#![forbid(unsafe_code)]

pub mod book_service;
pub mod error;
pub mod library_services;
pub mod reading_session_service;

pub use library_core::Clock;

pub use book_service::BookService;
pub use error::{BookServiceError, LibraryServicesError, ReadingSessionError};
pub use library_services::LibraryServices;
pub use reading_session_service::ReadingSessionService;
