//! Core data model for the rolling-window compliance engine.
//!
//! Every type here is a transient value: constructed per call from
//! caller-supplied data, never mutated in place, never retained between
//! invocations. All public result types are serde-enabled so the CLI and
//! WASM surfaces can pass them across their boundaries as JSON.

use crate::error::{Result, StayError};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of the rolling window in calendar days.
pub const WINDOW_DAYS: i64 = 180;

/// Days to subtract from a reference date to reach the window start
/// (the window is inclusive on both ends, so 180 days span 179 steps).
pub const WINDOW_LOOKBACK: i64 = WINDOW_DAYS - 1;

/// Maximum permitted days of presence within any rolling window.
pub const MAX_STAY_DAYS: i64 = 90;

/// Default safety margin subtracted by the conservative planner.
pub const DEFAULT_SAFETY_BUFFER_DAYS: i64 = 5;

/// A single stay interval in one country.
///
/// A trip occupies every calendar day in `[start_date, end_date]` inclusive —
/// the entry day and the exit day both count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Opaque identifier supplied by the storage collaborator.
    pub id: String,
    /// ISO 3166-1 alpha-2 country code (not interpreted by the engine).
    pub country_code: String,
    /// First occupied day.
    pub start_date: NaiveDate,
    /// Last occupied day, inclusive.
    pub end_date: NaiveDate,
    /// Stored length in days. Informational only: compliance math always
    /// derives length from the dates, and a non-zero mismatch is surfaced
    /// by `validate_trips` as a warning.
    #[serde(default)]
    pub days: i64,
}

impl Trip {
    /// Build a trip, computing `days` from the dates.
    ///
    /// # Errors
    /// Returns `StayError::ReversedRange` if `start_date > end_date`.
    pub fn new(
        id: impl Into<String>,
        country_code: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        if start_date > end_date {
            return Err(StayError::ReversedRange {
                start: start_date,
                end: end_date,
            });
        }
        let days = (end_date - start_date).num_days() + 1;
        Ok(Self {
            id: id.into(),
            country_code: country_code.into(),
            start_date,
            end_date,
            days,
        })
    }

    /// Inclusive length in days derived from the dates. Negative for a
    /// reversed record; callers doing math reject those first.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Whether this trip occupies the given calendar day.
    pub fn occupies(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns `StayError::ReversedRange` if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StayError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering `length_days` days beginning at `start`.
    ///
    /// # Errors
    /// Returns `StayError::InvalidBounds` if `length_days < 1`.
    pub fn with_length(start: NaiveDate, length_days: i64) -> Result<Self> {
        if length_days < 1 {
            return Err(StayError::InvalidBounds(format!(
                "range length must be at least 1 day, got {}",
                length_days
            )));
        }
        Ok(Self {
            start,
            end: start + Duration::days(length_days - 1),
        })
    }

    /// Inclusive length in days.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Severity of a validation finding.
///
/// `Error` means the trip set cannot be trusted for compliance math until
/// corrected; `Warning` is informational and never blocks calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding against a trip set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The field the finding is about (e.g. "end_date", "id").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
    pub severity: Severity,
    /// The offending trip, when the finding is trip-specific.
    pub trip_id: Option<String>,
}

impl ValidationIssue {
    pub(crate) fn error(
        field: &str,
        message: impl Into<String>,
        trip_id: Option<&str>,
    ) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Error,
            trip_id: trip_id.map(str::to_string),
        }
    }

    pub(crate) fn warning(
        field: &str,
        message: impl Into<String>,
        trip_id: Option<&str>,
    ) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            severity: Severity::Warning,
            trip_id: trip_id.map(str::to_string),
        }
    }
}

/// Complete validation report for a trip set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSetValidation {
    /// True when no `Error`-severity findings exist. Warnings do not
    /// affect this flag.
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Per-day usage record inside one rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayUsage {
    pub date: NaiveDate,
    /// Distinct occupied days from the window start through this date.
    pub cumulative_days_in_window: usize,
    /// True once the cumulative count exceeds the 90-day ceiling.
    pub is_violation: bool,
    /// Ids of the trips covering this exact day (empty for free days).
    pub contributing_trip_ids: Vec<String>,
}

/// Compliance evaluation for one reference date.
///
/// The window is the 180 calendar days ending on and including
/// `reference_date`: `window_start = reference_date - 179 days`,
/// `window_end = reference_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Distinct calendar days covered by any trip within the window.
    pub total_days_used: i64,
    /// `max(0, 90 - total_days_used)`.
    pub days_remaining: i64,
    pub is_compliant: bool,
    /// `max(0, total_days_used - 90)`.
    pub overstay_days: i64,
    /// One record per day of the window, oldest first.
    pub daily_breakdown: Vec<DayUsage>,
}
