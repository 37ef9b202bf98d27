//! Error types for court-availability operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// Empty catalog, malformed window bounds, or a window that does not
    /// split into whole cells. Aborts the whole call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A time of day outside 00:00-23:30 or not on a half-hour boundary.
    #[error("Invalid time of day: {hours}:{minutes:02}")]
    InvalidTime { hours: u32, minutes: u32 },

    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Request store error: {0}")]
    Store(String),

    #[error("Unknown booking request: #{0}")]
    UnknownRequest(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
