//! Detect day-level conflicts between a candidate range and existing trips.
//!
//! Conflict detection is independent of the rolling-window math: a range can
//! be perfectly compliant and still collide with a trip already on the
//! books. Two ranges conflict when their day-level intersection is
//! non-empty, except that a *single shared boundary day* may be forgiven by
//! policy — leaving one country and entering the next on the same calendar
//! day is how border crossings actually work.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StayError};
use crate::types::{DateRange, Trip};

/// Which boundary-adjacent candidate ranges are permitted.
///
/// Policy is configuration, not a hardcoded exception: the default allows
/// both same-day shapes, and strict callers opt out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapPolicy {
    /// Candidate may start on the day an existing trip ends.
    pub allow_same_day_travel: bool,
    /// Candidate may end on the day an existing trip starts.
    pub allow_border_transitions: bool,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        Self {
            allow_same_day_travel: true,
            allow_border_transitions: true,
        }
    }
}

impl OverlapPolicy {
    /// Policy that treats any shared day as a conflict.
    pub fn strict() -> Self {
        Self {
            allow_same_day_travel: false,
            allow_border_transitions: false,
        }
    }
}

/// A day-level collision between the candidate range and one existing trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConflict {
    pub trip_id: String,
    pub country_code: String,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
    /// Inclusive day count of the intersection.
    pub overlap_days: i64,
}

/// Result of validating a candidate range against a trip set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeValidation {
    pub is_valid: bool,
    pub conflicts: Vec<RangeConflict>,
    /// Already-occupied days inside the candidate range, sorted and deduped.
    pub occupied_dates: Vec<NaiveDate>,
}

/// A non-conflicting replacement range for a conflicted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeRange {
    pub range: DateRange,
    /// Days the range was moved from the requested start; negative means
    /// earlier.
    pub shift_days: i64,
}

fn check_trip_dates(trip: &Trip) -> Result<()> {
    if trip.start_date > trip.end_date {
        return Err(StayError::ReversedRange {
            start: trip.start_date,
            end: trip.end_date,
        });
    }
    Ok(())
}

/// Validate a candidate range against every existing trip.
///
/// Each trip is intersected with the candidate at day granularity. A
/// non-empty intersection is a conflict unless it is exactly one shared
/// boundary day that the policy forgives: the candidate starting on a
/// trip's last day (`allow_same_day_travel`) or ending on a trip's first
/// day (`allow_border_transitions`). Any wider intersection always
/// conflicts.
///
/// `occupied_dates` reports every occupied day inside the candidate range
/// regardless of policy, so callers can render the collision precisely.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any existing trip has reversed
/// dates.
pub fn validate_date_range(
    candidate: &DateRange,
    existing: &[Trip],
    policy: &OverlapPolicy,
) -> Result<DateRangeValidation> {
    let mut conflicts = Vec::new();
    let mut occupied: BTreeSet<NaiveDate> = BTreeSet::new();

    for trip in existing {
        check_trip_dates(trip)?;

        let overlap_start = candidate.start.max(trip.start_date);
        let overlap_end = candidate.end.min(trip.end_date);
        if overlap_start > overlap_end {
            continue;
        }

        let mut day = overlap_start;
        while day <= overlap_end {
            occupied.insert(day);
            day += Duration::days(1);
        }

        let overlap_days = (overlap_end - overlap_start).num_days() + 1;
        if overlap_days == 1 {
            let exit_day = candidate.start == trip.end_date && policy.allow_same_day_travel;
            let entry_day = candidate.end == trip.start_date && policy.allow_border_transitions;
            if exit_day || entry_day {
                continue;
            }
        }

        conflicts.push(RangeConflict {
            trip_id: trip.id.clone(),
            country_code: trip.country_code.clone(),
            overlap_start,
            overlap_end,
            overlap_days,
        });
    }

    Ok(DateRangeValidation {
        is_valid: conflicts.is_empty(),
        conflicts,
        occupied_dates: occupied.into_iter().collect(),
    })
}

/// Every calendar day covered by any trip, sorted.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn get_all_occupied_dates(trips: &[Trip]) -> Result<BTreeSet<NaiveDate>> {
    let mut dates = BTreeSet::new();
    for trip in trips {
        check_trip_dates(trip)?;
        let mut day = trip.start_date;
        while day <= trip.end_date {
            dates.insert(day);
            day += Duration::days(1);
        }
    }
    Ok(dates)
}

/// Whether any trip covers the given day.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn is_date_occupied(trips: &[Trip], date: NaiveDate) -> Result<bool> {
    for trip in trips {
        check_trip_dates(trip)?;
        if trip.occupies(date) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// All trips covering the given day, in input order.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn get_trips_on_date<'a>(trips: &'a [Trip], date: NaiveDate) -> Result<Vec<&'a Trip>> {
    let mut on_date = Vec::new();
    for trip in trips {
        check_trip_dates(trip)?;
        if trip.occupies(date) {
            on_date.push(trip);
        }
    }
    Ok(on_date)
}

/// First `length_days` window at or after `preferred_start` that validates
/// cleanly, scanning one day at a time for at most `search_limit_days`
/// candidate starts.
///
/// # Errors
/// Returns `StayError::InvalidBounds` for a non-positive length or limit;
/// `StayError::ReversedRange` if any existing trip has reversed dates.
pub fn find_next_available_date_range(
    preferred_start: NaiveDate,
    length_days: i64,
    existing: &[Trip],
    search_limit_days: i64,
    policy: &OverlapPolicy,
) -> Result<Option<DateRange>> {
    if search_limit_days < 1 {
        return Err(StayError::InvalidBounds(format!(
            "search limit must be at least 1 day, got {}",
            search_limit_days
        )));
    }

    for offset in 0..=search_limit_days {
        let candidate = DateRange::with_length(preferred_start + Duration::days(offset), length_days)?;
        if validate_date_range(&candidate, existing, policy)?.is_valid {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

/// Rank nearby non-conflicting windows around a conflicted range.
///
/// Scans outward in both directions from the requested start, up to
/// `search_limit_days` away, and ranks hits by distance — the smallest
/// shift first, earlier direction winning ties. At most `max_suggestions`
/// results are returned.
///
/// # Errors
/// Returns `StayError::InvalidBounds` for a non-positive limit;
/// `StayError::ReversedRange` if any existing trip has reversed dates.
pub fn suggest_alternative_dates(
    conflicted: &DateRange,
    existing: &[Trip],
    policy: &OverlapPolicy,
    search_limit_days: i64,
    max_suggestions: usize,
) -> Result<Vec<AlternativeRange>> {
    if search_limit_days < 1 {
        return Err(StayError::InvalidBounds(format!(
            "search limit must be at least 1 day, got {}",
            search_limit_days
        )));
    }

    let length = conflicted.len_days();
    let mut suggestions = Vec::new();

    for distance in 1..=search_limit_days {
        if suggestions.len() >= max_suggestions {
            break;
        }
        // Earlier candidate first so ties favor the earlier range.
        for shift in [-distance, distance] {
            if suggestions.len() >= max_suggestions {
                break;
            }
            let candidate =
                DateRange::with_length(conflicted.start + Duration::days(shift), length)?;
            if validate_date_range(&candidate, existing, policy)?.is_valid {
                suggestions.push(AlternativeRange {
                    range: candidate,
                    shift_days: shift,
                });
            }
        }
    }

    Ok(suggestions)
}
