//! # stay-engine
//!
//! Exact "90 days in any rolling 180-day window" stay-compliance engine.
//!
//! Given a set of date-stamped stay intervals, the engine computes day
//! usage ending on any reference date, detects overstays, validates that
//! candidate intervals do not collide with existing ones, and searches for
//! viable future travel windows. Everything is a pure, synchronous function
//! over borrowed data — no I/O, no shared state, no input mutation.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stay_engine::{calculate_compliance, Trip};
//!
//! let trips = vec![Trip::new(
//!     "t1",
//!     "FR",
//!     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
//! )
//! .unwrap()];
//!
//! let reference = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
//! let result = calculate_compliance(&trips, reference).unwrap();
//! assert_eq!(result.total_days_used, 14);
//! assert!(result.is_compliant);
//! ```
//!
//! ## Modules
//!
//! - [`normalize`] — canonicalize incoming date representations to calendar days
//! - [`window`] — the rolling-window engine: day counting, compliance, breakdowns, searches
//! - [`overlap`] — day-level conflict detection between ranges and trips
//! - [`planner`] — forecasting and ranked travel-window search
//! - [`types`] — the shared data model
//! - [`error`] — error types

pub mod error;
pub mod normalize;
pub mod overlap;
pub mod planner;
pub mod types;
pub mod window;

pub use error::StayError;
pub use normalize::parse_day;
pub use overlap::{validate_date_range, OverlapPolicy};
pub use planner::{
    calculate_emergency_extension, calculate_safe_travel, find_optimal_travel_dates,
    forecast_travel,
};
pub use types::{ComplianceResult, DateRange, DayUsage, Severity, Trip, TripSetValidation};
pub use window::{
    calculate_compliance, calculate_days_in_window, calculate_max_consecutive_days,
    find_latest_valid_start_date, generate_detailed_breakdown, get_next_reset_date,
    validate_planned_trip, validate_trips,
};
