#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod time;
pub mod wire;

pub use error::InvalidInput;
pub use progress::{DeadlineStatus, Projection, ReadingProgress};
pub use time::Clock;
