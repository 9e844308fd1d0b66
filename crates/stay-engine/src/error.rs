//! Error types for stay-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StayError {
    /// The input string could not be parsed as a calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A trip or range whose start falls after its end. The engine never
    /// silently swaps the endpoints; the caller must fix the record.
    #[error("Reversed range: start {start} is after end {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    /// A trip id that does not exist in the supplied trip set.
    #[error("Unknown trip id: {0}")]
    UnknownTrip(String),

    /// Search bounds that cannot terminate or describe an empty range.
    #[error("Invalid search bounds: {0}")]
    InvalidBounds(String),
}

pub type Result<T> = std::result::Result<T, StayError>;
