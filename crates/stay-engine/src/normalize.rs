//! Date normalization — canonicalizes any incoming date representation to a
//! plain calendar day.
//!
//! The canonical day value throughout the engine is `chrono::NaiveDate`.
//! Normalization is idempotent and never consults the process-local
//! timezone: two representations that denote the same calendar day produce
//! the same `NaiveDate` no matter what time-of-day or offset they carry.

use crate::error::{Result, StayError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a calendar day out of a date or datetime string.
///
/// Accepts, in order of preference:
/// - a bare ISO date (`"2026-03-01"`),
/// - an RFC 3339 datetime (`"2026-03-01T23:30:00+02:00"`),
/// - a naive datetime (`"2026-03-01T23:30:00"`).
///
/// For datetime forms the civil date *as written* is returned — the time
/// and offset are discarded rather than converted, so `...T00:00:00` and
/// `...T23:59:59` on the same day normalize identically.
///
/// # Errors
/// Returns `StayError::InvalidDate` when none of the accepted forms match.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = trimmed.parse::<NaiveDate>() {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.date());
    }

    Err(StayError::InvalidDate(trimmed.to_string()))
}

/// Calendar day of a zoned datetime, in that datetime's own zone.
pub fn day_of<Tz: TimeZone>(dt: &DateTime<Tz>) -> NaiveDate {
    dt.date_naive()
}

/// Calendar day of a stored UTC instant as experienced in a named IANA zone.
///
/// Storage collaborators persist instants; travelers live in local days.
/// A flight landing at 23:30 UTC on March 1 is already March 2 in Athens,
/// and that local day is the one border control counts.
pub fn day_in_zone(instant: DateTime<Utc>, zone: chrono_tz::Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Resolve an IANA zone name, for callers holding zone ids as strings.
///
/// # Errors
/// Returns `StayError::InvalidDate` for unknown zone identifiers.
pub fn resolve_zone(name: &str) -> Result<chrono_tz::Tz> {
    name.parse()
        .map_err(|_| StayError::InvalidDate(format!("unknown timezone: {}", name)))
}
