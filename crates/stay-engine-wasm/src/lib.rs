//! WASM bindings for stay-engine.
//!
//! Exposes compliance calculation, planned-trip validation, range conflict
//! checking, and travel-window search to JavaScript via `wasm-bindgen`. All
//! complex types are passed as JSON strings with ISO 8601 dates.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p stay-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/stay-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/stay_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stay_engine::normalize::parse_day;
use stay_engine::overlap::{validate_date_range, OverlapPolicy};
use stay_engine::planner::find_optimal_travel_dates;
use stay_engine::window::{calculate_compliance, get_next_reset_date, validate_planned_trip};
use stay_engine::{DateRange, Trip};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for trips passed from JavaScript. Dates may carry a time
/// component; only the calendar day is used.
#[derive(Deserialize)]
struct TripInput {
    id: String,
    #[serde(default)]
    country_code: String,
    start_date: String,
    end_date: String,
}

#[derive(Serialize)]
struct PlannedTripCheckDto {
    is_valid: bool,
    violation_days: i64,
    violation_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers: parse JSON inputs into engine types
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    parse_day(s).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a JSON array of trip objects into `Vec<Trip>`.
fn parse_trips_json(json: &str) -> Result<Vec<Trip>, JsValue> {
    let inputs: Vec<TripInput> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid trips JSON: {}", e)))?;

    inputs
        .into_iter()
        .map(|input| {
            let start = parse_date(&input.start_date)?;
            let end = parse_date(&input.end_date)?;
            Trip::new(input.id, input.country_code, start, end)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Evaluate compliance for the 180-day window ending on `reference_date`.
///
/// `trips_json` must be a JSON array of `{id, country_code, start_date,
/// end_date}` objects. Returns the full compliance result as JSON,
/// including the per-day breakdown.
#[wasm_bindgen(js_name = "calculateCompliance")]
pub fn calculate_compliance_js(trips_json: &str, reference_date: &str) -> Result<String, JsValue> {
    let trips = parse_trips_json(trips_json)?;
    let reference = parse_date(reference_date)?;

    let result =
        calculate_compliance(&trips, reference).map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_json(&result)
}

/// Simulate inserting a candidate trip and report the earliest violation.
///
/// Returns a JSON object with `is_valid`, `violation_days`, and
/// `violation_date`.
#[wasm_bindgen(js_name = "validatePlannedTrip")]
pub fn validate_planned_trip_js(
    trips_json: &str,
    start_date: &str,
    end_date: &str,
) -> Result<String, JsValue> {
    let trips = parse_trips_json(trips_json)?;
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;

    let candidate = Trip::new("planned", "", start, end)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let check = validate_planned_trip(&trips, &candidate)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_json(&PlannedTripCheckDto {
        is_valid: check.is_valid,
        violation_days: check.violation_days,
        violation_date: check.violation_date.map(|d| d.to_string()),
    })
}

/// Check a candidate range for day-level conflicts with existing trips.
///
/// When `strict` is true, boundary-day sharing (same-day travel, border
/// transitions) is treated as a conflict too.
#[wasm_bindgen(js_name = "validateDateRange")]
pub fn validate_date_range_js(
    trips_json: &str,
    start_date: &str,
    end_date: &str,
    strict: bool,
) -> Result<String, JsValue> {
    let trips = parse_trips_json(trips_json)?;
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;

    let candidate =
        DateRange::new(start, end).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let policy = if strict {
        OverlapPolicy::strict()
    } else {
        OverlapPolicy::default()
    };

    let result = validate_date_range(&candidate, &trips, &policy)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_json(&result)
}

/// Enumerate and rank candidate travel windows.
///
/// Returns a JSON array of scored windows, best first.
#[wasm_bindgen(js_name = "findOptimalTravelDates")]
pub fn find_optimal_travel_dates_js(
    trips_json: &str,
    desired_days: i64,
    earliest_start: &str,
    latest_end: &str,
) -> Result<String, JsValue> {
    let trips = parse_trips_json(trips_json)?;
    let earliest = parse_date(earliest_start)?;
    let latest = parse_date(latest_end)?;

    let ranked = find_optimal_travel_dates(&trips, desired_days, earliest, latest)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_json(&ranked)
}

/// Earliest future date on which a currently-counted day exits the window.
///
/// Returns an ISO date string, or `null` when nothing is counted.
#[wasm_bindgen(js_name = "getNextResetDate")]
pub fn get_next_reset_date_js(trips_json: &str, reference_date: &str) -> Result<JsValue, JsValue> {
    let trips = parse_trips_json(trips_json)?;
    let reference = parse_date(reference_date)?;

    let reset = get_next_reset_date(&trips, reference)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(match reset {
        Some(date) => JsValue::from_str(&date.to_string()),
        None => JsValue::NULL,
    })
}
