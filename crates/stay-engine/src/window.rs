//! The rolling 180-day window engine.
//!
//! Everything here is a pure function over a borrowed trip slice. The one
//! load-bearing primitive is [`day_occupancy`]: a fold of all trips, clipped
//! to the window, into a date-ordered map of occupied days. The compliance
//! count, the per-day breakdown, and every search routine consume that same
//! fold, so they cannot drift apart.
//!
//! Usage is counted as *distinct* calendar days covered by any trip — two
//! trips sharing a day contribute that day once. A per-trip length sum is
//! only equivalent when trips never overlap, which the engine does not
//! assume.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StayError};
use crate::types::{
    ComplianceResult, DayUsage, Trip, TripSetValidation, ValidationIssue, MAX_STAY_DAYS,
    WINDOW_DAYS, WINDOW_LOOKBACK,
};

/// Outcome of simulating a candidate trip against an existing trip set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTripCheck {
    pub is_valid: bool,
    /// Overstay magnitude at the first violating day (0 when valid).
    pub violation_days: i64,
    /// Earliest day of the candidate on which the rolling total exceeds 90.
    pub violation_date: Option<NaiveDate>,
}

/// Inclusive window bounds for a reference date.
pub fn window_bounds(reference_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        reference_date - Duration::days(WINDOW_LOOKBACK),
        reference_date,
    )
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

/// Internal candidate used by the search routines. The id only ever shows
/// up in breakdowns the searches discard.
fn hypothetical_stay(start: NaiveDate, end: NaiveDate) -> Trip {
    Trip {
        id: "planned".to_string(),
        country_code: String::new(),
        start_date: start,
        end_date: end,
        days: (end - start).num_days() + 1,
    }
}

/// Fold all trips, clipped to `[window_start, window_end]`, into a
/// date-ordered occupancy map: occupied day → contributing trip ids.
///
/// Trips entirely outside the window contribute nothing. The map size is
/// the distinct-day usage count; the entries drive the daily breakdown.
///
/// # Errors
/// Returns `StayError::ReversedRange` for a trip with `start > end` — a
/// malformed record makes every downstream number untrustworthy, so it is
/// surfaced instead of skipped.
pub(crate) fn day_occupancy(
    trips: &[Trip],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<BTreeMap<NaiveDate, Vec<String>>> {
    let mut occupancy: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();

    for trip in trips {
        check_trip_dates(trip)?;

        // Clip to the window, discarding trips entirely outside.
        let clipped_start = trip.start_date.max(window_start);
        let clipped_end = trip.end_date.min(window_end);
        if clipped_start > clipped_end {
            continue;
        }

        let mut day = clipped_start;
        while day <= clipped_end {
            occupancy.entry(day).or_default().push(trip.id.clone());
            day += Duration::days(1);
        }
    }

    Ok(occupancy)
}

/// Count distinct occupied days in the 180-day window ending on `end_date`.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn calculate_days_in_window(trips: &[Trip], end_date: NaiveDate) -> Result<i64> {
    let (window_start, window_end) = window_bounds(end_date);
    let occupancy = day_occupancy(trips, window_start, window_end)?;
    Ok(occupancy.len() as i64)
}

/// Build one `DayUsage` record for every day of the window, oldest first,
/// from an already-computed occupancy map.
fn breakdown_from_occupancy(
    occupancy: &BTreeMap<NaiveDate, Vec<String>>,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<DayUsage> {
    let mut records = Vec::with_capacity(((window_end - window_start).num_days() + 1) as usize);
    let mut cumulative = 0usize;

    let mut day = window_start;
    while day <= window_end {
        let contributing = occupancy.get(&day).cloned().unwrap_or_default();
        if !contributing.is_empty() {
            cumulative += 1;
        }
        records.push(DayUsage {
            date: day,
            cumulative_days_in_window: cumulative,
            is_violation: cumulative as i64 > MAX_STAY_DAYS,
            contributing_trip_ids: contributing,
        });
        day += Duration::days(1);
    }

    records
}

/// Per-day usage records for the window ending on `reference_date`.
///
/// Shares its accumulation with [`calculate_days_in_window`]: the final
/// cumulative value always equals the window count for the same inputs.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn generate_detailed_breakdown(
    trips: &[Trip],
    reference_date: NaiveDate,
) -> Result<Vec<DayUsage>> {
    let (window_start, window_end) = window_bounds(reference_date);
    let occupancy = day_occupancy(trips, window_start, window_end)?;
    Ok(breakdown_from_occupancy(&occupancy, window_start, window_end))
}

/// Evaluate compliance for the window ending on `reference_date`.
///
/// An empty trip list is a valid zero-usage input: 0 days used, 90
/// remaining, compliant.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn calculate_compliance(
    trips: &[Trip],
    reference_date: NaiveDate,
) -> Result<ComplianceResult> {
    let (window_start, window_end) = window_bounds(reference_date);
    let occupancy = day_occupancy(trips, window_start, window_end)?;

    let total_days_used = occupancy.len() as i64;
    let daily_breakdown = breakdown_from_occupancy(&occupancy, window_start, window_end);

    Ok(ComplianceResult {
        reference_date,
        window_start,
        window_end,
        total_days_used,
        days_remaining: (MAX_STAY_DAYS - total_days_used).max(0),
        is_compliant: total_days_used <= MAX_STAY_DAYS,
        overstay_days: (total_days_used - MAX_STAY_DAYS).max(0),
        daily_breakdown,
    })
}

/// Simulate inserting `candidate` into `existing` and check every day the
/// candidate occupies.
///
/// The window's start point shifts with each evaluated day, so the first
/// violation can appear *before* the candidate's last day — e.g. when old
/// usage is still inside the window mid-stay but has rolled out by the end.
/// The earliest violating date and the overstay magnitude at that date are
/// reported.
///
/// # Errors
/// Returns `StayError::ReversedRange` if the candidate or any existing trip
/// has reversed dates.
pub fn validate_planned_trip(existing: &[Trip], candidate: &Trip) -> Result<PlannedTripCheck> {
    check_trip_dates(candidate)?;

    let mut combined = existing.to_vec();
    combined.push(candidate.clone());

    let mut day = candidate.start_date;
    while day <= candidate.end_date {
        let total = calculate_days_in_window(&combined, day)?;
        if total > MAX_STAY_DAYS {
            return Ok(PlannedTripCheck {
                is_valid: false,
                violation_days: total - MAX_STAY_DAYS,
                violation_date: Some(day),
            });
        }
        day += Duration::days(1);
    }

    Ok(PlannedTripCheck {
        is_valid: true,
        violation_days: 0,
        violation_date: None,
    })
}

/// Latest start date in `[earliest_start, latest_start]` from which a
/// `trip_length`-day stay remains compliant on every one of its days.
///
/// Walks candidates from `latest_start` downward and returns the first
/// (i.e. latest) hit, or `None` when no start in range works.
///
/// # Errors
/// Returns `StayError::InvalidBounds` for an empty range or non-positive
/// length; `StayError::ReversedRange` if any existing trip has reversed
/// dates.
pub fn find_latest_valid_start_date(
    existing: &[Trip],
    trip_length: i64,
    earliest_start: NaiveDate,
    latest_start: NaiveDate,
) -> Result<Option<NaiveDate>> {
    if trip_length < 1 {
        return Err(StayError::InvalidBounds(format!(
            "trip length must be at least 1 day, got {}",
            trip_length
        )));
    }
    if earliest_start > latest_start {
        return Err(StayError::InvalidBounds(format!(
            "earliest start {} is after latest start {}",
            earliest_start, latest_start
        )));
    }

    let mut start = latest_start;
    loop {
        let end = start + Duration::days(trip_length - 1);
        let check = validate_planned_trip(existing, &hypothetical_stay(start, end))?;
        if check.is_valid {
            return Ok(Some(start));
        }
        if start == earliest_start {
            return Ok(None);
        }
        start -= Duration::days(1);
    }
}

/// Longest compliant consecutive stay beginning at `start_date`.
///
/// Extends a hypothetical stay one day at a time and stops at the first day
/// whose rolling total would exceed 90. The result is capped at 90 by the
/// rule itself: a 91st day is always inside its own window.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any existing trip has reversed
/// dates.
pub fn calculate_max_consecutive_days(existing: &[Trip], start_date: NaiveDate) -> Result<i64> {
    let mut longest = 0;

    for length in 1..=MAX_STAY_DAYS {
        let end = start_date + Duration::days(length - 1);
        let mut combined = existing.to_vec();
        combined.push(hypothetical_stay(start_date, end));

        // Each new end day is the only unchecked day: all earlier stay days
        // were the end day of a previous, shorter iteration.
        if calculate_days_in_window(&combined, end)? > MAX_STAY_DAYS {
            break;
        }
        longest = length;
    }

    Ok(longest)
}

/// Earliest future date on which a currently-counted day exits the rolling
/// window ending on `reference_date`.
///
/// A trip's first day leaves the window exactly 180 days after the trip
/// started, so this is the minimum of `start_date + 180` over trips whose
/// start is on or after the current window start. `None` when no trip is
/// counted.
///
/// # Errors
/// Returns `StayError::ReversedRange` if any trip has reversed dates.
pub fn get_next_reset_date(
    trips: &[Trip],
    reference_date: NaiveDate,
) -> Result<Option<NaiveDate>> {
    for trip in trips {
        check_trip_dates(trip)?;
    }

    let (window_start, _) = window_bounds(reference_date);
    Ok(trips
        .iter()
        .filter(|t| t.start_date >= window_start)
        .map(|t| t.start_date + Duration::days(WINDOW_DAYS))
        .min())
}

/// Structural validation of a trip set.
///
/// Runs every check and returns the complete issue list — it never stops at
/// the first problem, and it never blocks compliance math itself; whether
/// errors abort a calculation is the caller's policy.
///
/// Errors: reversed dates, empty ids, duplicate ids. Warnings: empty
/// country code, stored `days` disagreeing with the date span, a single
/// stay longer than 90 days, day-level overlap between trips, and
/// back-to-back trips with no gap.
pub fn validate_trips(trips: &[Trip]) -> TripSetValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut seen_ids: BTreeMap<&str, usize> = BTreeMap::new();

    for trip in trips {
        let tid = Some(trip.id.as_str());

        if trip.id.is_empty() {
            errors.push(ValidationIssue::error("id", "trip id is empty", None));
        } else {
            *seen_ids.entry(trip.id.as_str()).or_insert(0) += 1;
        }

        if trip.start_date > trip.end_date {
            errors.push(ValidationIssue::error(
                "end_date",
                format!(
                    "end date {} is before start date {}",
                    trip.end_date, trip.start_date
                ),
                tid,
            ));
            // Span-derived checks are meaningless on a reversed record.
            continue;
        }

        if trip.country_code.is_empty() {
            warnings.push(ValidationIssue::warning(
                "country_code",
                "country code is empty",
                tid,
            ));
        }

        let span = trip.span_days();
        if trip.days != 0 && trip.days != span {
            warnings.push(ValidationIssue::warning(
                "days",
                format!(
                    "stored length {} disagrees with date span {}",
                    trip.days, span
                ),
                tid,
            ));
        }

        if span > MAX_STAY_DAYS {
            warnings.push(ValidationIssue::warning(
                "end_date",
                format!(
                    "single stay of {} days exceeds the {}-day ceiling",
                    span, MAX_STAY_DAYS
                ),
                tid,
            ));
        }
    }

    for (id, count) in &seen_ids {
        if *count > 1 {
            errors.push(ValidationIssue::error(
                "id",
                format!("trip id '{}' appears {} times", id, count),
                Some(*id),
            ));
        }
    }

    // Pairwise checks over well-formed trips, in start order.
    let mut ordered: Vec<&Trip> = trips
        .iter()
        .filter(|t| t.start_date <= t.end_date)
        .collect();
    ordered.sort_by_key(|t| (t.start_date, t.end_date));

    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            let overlap_start = a.start_date.max(b.start_date);
            let overlap_end = a.end_date.min(b.end_date);
            if overlap_start <= overlap_end {
                let shared = (overlap_end - overlap_start).num_days() + 1;
                warnings.push(ValidationIssue::warning(
                    "start_date",
                    format!(
                        "trips '{}' and '{}' share {} day(s); shared days count once",
                        a.id, b.id, shared
                    ),
                    Some(b.id.as_str()),
                ));
            }
        }
    }

    for pair in ordered.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.start_date == a.end_date + Duration::days(1) {
            warnings.push(ValidationIssue::warning(
                "start_date",
                format!("trip '{}' starts the day after '{}' ends", b.id, a.id),
                Some(b.id.as_str()),
            ));
        }
    }

    TripSetValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
