//! Forecasting and search routines built on the window engine.
//!
//! The planner owns no day-counting logic of its own: every number here is
//! produced by `window` primitives, so a planner answer can never disagree
//! with a compliance report for the same trips.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StayError};
use crate::types::{Trip, DEFAULT_SAFETY_BUFFER_DAYS, MAX_STAY_DAYS};
use crate::window::{
    calculate_days_in_window, calculate_max_consecutive_days, validate_planned_trip,
    PlannedTripCheck,
};

/// Forecast for a single planned stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelForecast {
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub check: PlannedTripCheck,
}

/// A scored candidate travel window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Compliant days actually achievable from this start, capped at the
    /// requested length.
    pub available_days: i64,
    /// Window usage at the end of the stay, as a fraction of the ceiling.
    pub post_trip_usage_pct: f64,
    pub score: f64,
}

/// Outcome of extending an in-progress trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionCheck {
    pub trip_id: String,
    pub new_end_date: NaiveDate,
    pub is_compliant: bool,
    /// First extension day on which the rolling total exceeds 90.
    pub violation_date: Option<NaiveDate>,
    /// Overstay at the extended end date (0 when compliant).
    pub overstay_days: i64,
}

/// Conservative stay recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeTravelPlan {
    /// Unbuffered compliant ceiling from the start date.
    pub max_compliant_days: i64,
    pub buffer_days: i64,
    /// `min(desired, max(0, ceiling - buffer))`.
    pub recommended_days: i64,
}

/// Forecast a planned stay of `planned_duration` days from `planned_start`.
///
/// Thin wrapper over [`validate_planned_trip`], echoing the planned range
/// alongside the check.
///
/// # Errors
/// Returns `StayError::InvalidBounds` for a non-positive duration;
/// `StayError::ReversedRange` if any existing trip has reversed dates.
pub fn forecast_travel(
    existing: &[Trip],
    planned_start: NaiveDate,
    planned_duration: i64,
) -> Result<TravelForecast> {
    if planned_duration < 1 {
        return Err(StayError::InvalidBounds(format!(
            "planned duration must be at least 1 day, got {}",
            planned_duration
        )));
    }

    let planned_end = planned_start + Duration::days(planned_duration - 1);
    let candidate = Trip {
        id: "planned".to_string(),
        country_code: String::new(),
        start_date: planned_start,
        end_date: planned_end,
        days: planned_duration,
    };
    let check = validate_planned_trip(existing, &candidate)?;

    Ok(TravelForecast {
        planned_start,
        planned_end,
        check,
    })
}

/// Enumerate and rank candidate windows of up to `desired_days` across
/// `[earliest_start, latest_end]`.
///
/// Every start date that leaves room for the stay inside the range is
/// scored on three axes: closeness of the achievable run to `desired_days`
/// (weight 50), how soon the stay can begin (weight 25), and how much
/// window headroom remains once it ends (weight 25). Results are sorted by
/// descending score, ties broken by earliest start. Starts with zero
/// compliant days available are skipped.
///
/// # Errors
/// Returns `StayError::InvalidBounds` when the range is empty, reversed, or
/// shorter than one day of stay; `StayError::ReversedRange` if any trip has
/// reversed dates.
pub fn find_optimal_travel_dates(
    trips: &[Trip],
    desired_days: i64,
    earliest_start: NaiveDate,
    latest_end: NaiveDate,
) -> Result<Vec<RankedWindow>> {
    if desired_days < 1 {
        return Err(StayError::InvalidBounds(format!(
            "desired days must be at least 1, got {}",
            desired_days
        )));
    }
    if earliest_start > latest_end {
        return Err(StayError::InvalidBounds(format!(
            "earliest start {} is after latest end {}",
            earliest_start, latest_end
        )));
    }

    let latest_start = latest_end - Duration::days(desired_days - 1);
    if latest_start < earliest_start {
        return Err(StayError::InvalidBounds(format!(
            "a {}-day stay does not fit between {} and {}",
            desired_days, earliest_start, latest_end
        )));
    }

    let span = (latest_start - earliest_start).num_days();
    let mut candidates = Vec::new();

    let mut start = earliest_start;
    while start <= latest_start {
        let max_run = calculate_max_consecutive_days(trips, start)?;
        if max_run > 0 {
            let available = max_run.min(desired_days);
            let end = start + Duration::days(available - 1);

            let mut combined = trips.to_vec();
            combined.push(Trip {
                id: "planned".to_string(),
                country_code: String::new(),
                start_date: start,
                end_date: end,
                days: available,
            });
            let post_usage = calculate_days_in_window(&combined, end)? as f64;
            let post_trip_usage_pct = post_usage / MAX_STAY_DAYS as f64;

            let fit = available as f64 / desired_days as f64;
            let earliness = if span == 0 {
                1.0
            } else {
                1.0 - (start - earliest_start).num_days() as f64 / span as f64
            };
            let headroom = 1.0 - post_trip_usage_pct;

            candidates.push(RankedWindow {
                start,
                end,
                available_days: available,
                post_trip_usage_pct,
                score: fit * 50.0 + earliness * 25.0 + headroom * 25.0,
            });
        }
        start += Duration::days(1);
    }

    // Descending score; the earlier start wins a tie.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.start.cmp(&b.start))
    });

    Ok(candidates)
}

/// Check whether extending the named trip by `additional_days` stays
/// compliant.
///
/// The trip set is simulated with the named trip's end pushed out; every
/// added day is evaluated. Reports the first violating day and the overstay
/// at the new end date.
///
/// # Errors
/// Returns `StayError::UnknownTrip` when the id is absent,
/// `StayError::InvalidBounds` for a non-positive extension, and
/// `StayError::ReversedRange` if any trip has reversed dates.
pub fn calculate_emergency_extension(
    trips: &[Trip],
    current_trip_id: &str,
    additional_days: i64,
) -> Result<ExtensionCheck> {
    if additional_days < 1 {
        return Err(StayError::InvalidBounds(format!(
            "extension must be at least 1 day, got {}",
            additional_days
        )));
    }

    let current = trips
        .iter()
        .find(|t| t.id == current_trip_id)
        .ok_or_else(|| StayError::UnknownTrip(current_trip_id.to_string()))?;

    let old_end = current.end_date;
    let new_end = old_end + Duration::days(additional_days);

    let mut simulated = trips.to_vec();
    for trip in &mut simulated {
        if trip.id == current_trip_id {
            trip.end_date = new_end;
            trip.days = trip.span_days();
        }
    }

    let mut violation_date = None;
    let mut day = old_end + Duration::days(1);
    while day <= new_end {
        if calculate_days_in_window(&simulated, day)? > MAX_STAY_DAYS {
            violation_date = Some(day);
            break;
        }
        day += Duration::days(1);
    }

    let end_total = calculate_days_in_window(&simulated, new_end)?;

    Ok(ExtensionCheck {
        trip_id: current_trip_id.to_string(),
        new_end_date: new_end,
        is_compliant: violation_date.is_none(),
        violation_date,
        overstay_days: (end_total - MAX_STAY_DAYS).max(0),
    })
}

/// Conservative recommended stay from `start_date`.
///
/// Subtracts a safety buffer (default 5 days) from the compliant ceiling,
/// then caps at the desired length. The unbuffered ceiling is reported so
/// callers can show how much margin the recommendation keeps.
///
/// # Errors
/// Returns `StayError::InvalidBounds` for non-positive desired days or a
/// negative buffer; `StayError::ReversedRange` if any trip has reversed
/// dates.
pub fn calculate_safe_travel(
    trips: &[Trip],
    start_date: NaiveDate,
    desired_days: i64,
    buffer_days: Option<i64>,
) -> Result<SafeTravelPlan> {
    if desired_days < 1 {
        return Err(StayError::InvalidBounds(format!(
            "desired days must be at least 1, got {}",
            desired_days
        )));
    }
    let buffer = buffer_days.unwrap_or(DEFAULT_SAFETY_BUFFER_DAYS);
    if buffer < 0 {
        return Err(StayError::InvalidBounds(format!(
            "buffer must not be negative, got {}",
            buffer
        )));
    }

    let max_compliant_days = calculate_max_consecutive_days(trips, start_date)?;

    Ok(SafeTravelPlan {
        max_compliant_days,
        buffer_days: buffer,
        recommended_days: desired_days.min((max_compliant_days - buffer).max(0)),
    })
}
