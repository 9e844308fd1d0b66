//! Tests for the rolling-window engine: day counting, compliance,
//! breakdowns, and the search primitives built on them.

use chrono::NaiveDate;
use stay_engine::error::StayError;
use stay_engine::window::{
    calculate_compliance, calculate_days_in_window, calculate_max_consecutive_days,
    find_latest_valid_start_date, generate_detailed_breakdown, get_next_reset_date,
    validate_planned_trip, window_bounds,
};
use stay_engine::Trip;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper to build a trip from date tuples.
fn trip(id: &str, country: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Trip {
    Trip::new(
        id,
        country,
        date(start.0, start.1, start.2),
        date(end.0, end.1, end.2),
    )
    .unwrap()
}

// ── Window bounds ───────────────────────────────────────────────────────────

#[test]
fn window_spans_180_inclusive_days() {
    let reference = date(2026, 6, 29);
    let (start, end) = window_bounds(reference);

    assert_eq!(end, reference);
    assert_eq!(start, date(2026, 1, 1));
    assert_eq!((end - start).num_days() + 1, 180);
}

// ── Compliance basics ───────────────────────────────────────────────────────

#[test]
fn empty_trip_list_is_compliant_zero_usage() {
    let result = calculate_compliance(&[], date(2026, 12, 15)).unwrap();

    assert_eq!(result.total_days_used, 0);
    assert_eq!(result.days_remaining, 90);
    assert_eq!(result.overstay_days, 0);
    assert!(result.is_compliant);
    assert_eq!(result.window_end, date(2026, 12, 15));
}

#[test]
fn trip_entirely_before_window_contributes_nothing() {
    // Window for 2026-12-15 starts 2026-06-19; a long spring trip is gone.
    let trips = vec![trip("old", "FR", (2026, 2, 1), (2026, 4, 30))];

    let total = calculate_days_in_window(&trips, date(2026, 12, 15)).unwrap();
    assert_eq!(total, 0, "days outside the window must not count");
}

#[test]
fn ninety_day_trip_ending_on_reference_is_exactly_compliant() {
    // 2026-01-01..2026-03-31 is 31 + 28 + 31 = 90 days inclusive.
    let trips = vec![trip("t", "ES", (2026, 1, 1), (2026, 3, 31))];

    let result = calculate_compliance(&trips, date(2026, 3, 31)).unwrap();

    assert_eq!(result.total_days_used, 90);
    assert_eq!(result.days_remaining, 0);
    assert_eq!(result.overstay_days, 0);
    assert!(result.is_compliant, "exactly 90 days is still compliant");
}

#[test]
fn ninety_one_day_trip_is_a_one_day_overstay() {
    let trips = vec![trip("t", "ES", (2025, 12, 31), (2026, 3, 31))];

    let result = calculate_compliance(&trips, date(2026, 3, 31)).unwrap();

    assert_eq!(result.total_days_used, 91);
    assert_eq!(result.overstay_days, 1);
    assert_eq!(result.days_remaining, 0);
    assert!(!result.is_compliant);
}

#[test]
fn non_overlapping_trips_sum_their_lengths() {
    // 45 + 45 days, both inside the window.
    let trips = vec![
        trip("a", "FR", (2026, 1, 1), (2026, 2, 14)),
        trip("b", "IT", (2026, 3, 1), (2026, 4, 14)),
    ];

    let total = calculate_days_in_window(&trips, date(2026, 5, 1)).unwrap();
    assert_eq!(total, 90);
}

#[test]
fn overlapping_trips_count_shared_days_once() {
    // A: Jun 1-20 (20 days), B: Jun 15-30 (16 days), sharing Jun 15-20 (6).
    let trips = vec![
        trip("a", "FR", (2026, 6, 1), (2026, 6, 20)),
        trip("b", "IT", (2026, 6, 15), (2026, 6, 30)),
    ];

    let total = calculate_days_in_window(&trips, date(2026, 7, 15)).unwrap();
    assert_eq!(total, 20 + 16 - 6, "shared calendar days must not double count");
}

#[test]
fn advancing_reference_past_oldest_day_does_not_increase_usage() {
    // Trip Jan 1-10; window for Jun 29 starts exactly Jan 1 (all 10 count),
    // one day later the oldest day has rolled out.
    let trips = vec![trip("t", "DE", (2026, 1, 1), (2026, 1, 10))];

    let before = calculate_days_in_window(&trips, date(2026, 6, 29)).unwrap();
    let after = calculate_days_in_window(&trips, date(2026, 6, 30)).unwrap();

    assert_eq!(before, 10);
    assert_eq!(after, 9, "rolling the window forward drops the oldest day");
}

#[test]
fn leap_day_is_a_real_calendar_day() {
    // 2024 is a leap year: Feb 28, Feb 29, Mar 1 — three days.
    let leap = vec![trip("t", "AT", (2024, 2, 28), (2024, 3, 1))];
    assert_eq!(leap[0].days, 3);
    assert_eq!(
        calculate_days_in_window(&leap, date(2024, 3, 1)).unwrap(),
        3
    );

    // 2025 is not: Feb 28, Mar 1 — two days, no phantom Feb 29.
    let common = vec![trip("t", "AT", (2025, 2, 28), (2025, 3, 1))];
    assert_eq!(common[0].days, 2);
    assert_eq!(
        calculate_days_in_window(&common, date(2025, 3, 1)).unwrap(),
        2
    );
}

#[test]
fn four_trip_year_counts_only_window_overlap() {
    // Jan 10-16 FR, Mar 5-18 IT, Jun 1-21 DE, Sep 1-28 ES; reference Dec 15.
    // Window starts Jun 19, so only the June tail (19-21 = 3 days) and the
    // full September trip (28 days) count.
    let trips = vec![
        trip("fr", "FR", (2025, 1, 10), (2025, 1, 16)),
        trip("it", "IT", (2025, 3, 5), (2025, 3, 18)),
        trip("de", "DE", (2025, 6, 1), (2025, 6, 21)),
        trip("es", "ES", (2025, 9, 1), (2025, 9, 28)),
    ];

    let result = calculate_compliance(&trips, date(2025, 12, 15)).unwrap();

    assert_eq!(result.total_days_used, 31);
    assert!(result.is_compliant);
    assert_eq!(result.days_remaining, 59);
}

#[test]
fn long_summer_stay_overstays_by_seventeen() {
    // May 1 - Aug 15 is 107 days, all inside the window ending Aug 15.
    let trips = vec![trip("t", "PT", (2026, 5, 1), (2026, 8, 15))];

    let result = calculate_compliance(&trips, date(2026, 8, 15)).unwrap();

    assert_eq!(result.total_days_used, 107);
    assert_eq!(result.overstay_days, 17);
    assert!(!result.is_compliant);
}

#[test]
fn reversed_trip_is_an_error_not_a_guess() {
    let broken = Trip {
        id: "x".to_string(),
        country_code: "FR".to_string(),
        start_date: date(2026, 3, 10),
        end_date: date(2026, 3, 1),
        days: 0,
    };

    let err = calculate_compliance(&[broken], date(2026, 4, 1)).unwrap_err();
    assert!(matches!(err, StayError::ReversedRange { .. }));
}

// ── Detailed breakdown ──────────────────────────────────────────────────────

#[test]
fn breakdown_has_one_record_per_window_day() {
    let trips = vec![trip("t", "FR", (2026, 3, 1), (2026, 3, 5))];
    let breakdown = generate_detailed_breakdown(&trips, date(2026, 4, 1)).unwrap();

    assert_eq!(breakdown.len(), 180);
    assert_eq!(breakdown[0].date, date(2025, 10, 4));
    assert_eq!(breakdown[179].date, date(2026, 4, 1));
}

#[test]
fn breakdown_final_cumulative_matches_window_count() {
    let trips = vec![
        trip("a", "FR", (2026, 1, 1), (2026, 1, 20)),
        trip("b", "IT", (2026, 1, 15), (2026, 2, 10)),
    ];
    let reference = date(2026, 3, 1);

    let breakdown = generate_detailed_breakdown(&trips, reference).unwrap();
    let total = calculate_days_in_window(&trips, reference).unwrap();

    assert_eq!(
        breakdown.last().unwrap().cumulative_days_in_window as i64,
        total,
        "breakdown and count must come from the same fold"
    );
}

#[test]
fn breakdown_records_contributing_trips_per_day() {
    let trips = vec![
        trip("a", "FR", (2026, 3, 1), (2026, 3, 10)),
        trip("b", "IT", (2026, 3, 10), (2026, 3, 12)),
    ];
    let breakdown = generate_detailed_breakdown(&trips, date(2026, 3, 31)).unwrap();

    let shared = breakdown
        .iter()
        .find(|r| r.date == date(2026, 3, 10))
        .unwrap();
    assert_eq!(shared.contributing_trip_ids, vec!["a", "b"]);

    let free = breakdown
        .iter()
        .find(|r| r.date == date(2026, 3, 20))
        .unwrap();
    assert!(free.contributing_trip_ids.is_empty());
}

#[test]
fn breakdown_flags_violation_days() {
    // 100 consecutive days ending on the reference: the 91st day and later
    // are violations.
    let trips = vec![trip("t", "GR", (2026, 1, 1), (2026, 4, 10))];
    let breakdown = generate_detailed_breakdown(&trips, date(2026, 4, 10)).unwrap();

    let day_90 = breakdown.iter().find(|r| r.date == date(2026, 3, 31)).unwrap();
    let day_91 = breakdown.iter().find(|r| r.date == date(2026, 4, 1)).unwrap();

    assert_eq!(day_90.cumulative_days_in_window, 90);
    assert!(!day_90.is_violation);
    assert_eq!(day_91.cumulative_days_in_window, 91);
    assert!(day_91.is_violation);
}

// ── Planned-trip validation ─────────────────────────────────────────────────

#[test]
fn planned_trip_with_room_is_valid() {
    let existing = vec![trip("a", "FR", (2026, 1, 1), (2026, 1, 30))];
    let candidate = trip("plan", "IT", (2026, 5, 1), (2026, 5, 14));

    let check = validate_planned_trip(&existing, &candidate).unwrap();

    assert!(check.is_valid);
    assert_eq!(check.violation_days, 0);
    assert_eq!(check.violation_date, None);
}

#[test]
fn violation_can_appear_before_candidate_last_day() {
    // 89 days already used (Jan 1 - Mar 30). A 5-day trip from Mar 31:
    // Mar 31 brings the total to exactly 90, Apr 1 to 91 — the violation
    // surfaces on day two, not at the candidate's end.
    let existing = vec![trip("a", "ES", (2026, 1, 1), (2026, 3, 30))];
    let candidate = trip("plan", "FR", (2026, 3, 31), (2026, 4, 4));

    let check = validate_planned_trip(&existing, &candidate).unwrap();

    assert!(!check.is_valid);
    assert_eq!(check.violation_date, Some(date(2026, 4, 1)));
    assert_eq!(check.violation_days, 1);
}

#[test]
fn planned_trip_alone_up_to_ninety_days_is_valid() {
    let candidate = trip("plan", "FR", (2026, 1, 1), (2026, 3, 31));
    let check = validate_planned_trip(&[], &candidate).unwrap();
    assert!(check.is_valid);
}

// ── find_latest_valid_start_date ────────────────────────────────────────────

#[test]
fn latest_valid_start_with_no_trips_is_latest_bound() {
    let found = find_latest_valid_start_date(&[], 14, date(2026, 4, 1), date(2026, 6, 1)).unwrap();
    assert_eq!(found, Some(date(2026, 6, 1)));
}

#[test]
fn latest_valid_start_none_while_window_is_full() {
    // 90 days used Jan 1 - Mar 31; nothing rolls out before Jun 30, so no
    // start in April-May can host even one day.
    let existing = vec![trip("full", "DE", (2026, 1, 1), (2026, 3, 31))];

    let found =
        find_latest_valid_start_date(&existing, 10, date(2026, 4, 1), date(2026, 6, 1)).unwrap();
    assert_eq!(found, None);
}

#[test]
fn latest_valid_start_found_once_usage_rolls_out() {
    // Same 90 used; from Jun 30 the old days roll out one per day, exactly
    // matching a new stay's accumulation, so any start from Jun 30 works.
    let existing = vec![trip("full", "DE", (2026, 1, 1), (2026, 3, 31))];

    let found =
        find_latest_valid_start_date(&existing, 10, date(2026, 4, 1), date(2026, 7, 15)).unwrap();
    assert_eq!(found, Some(date(2026, 7, 15)), "latest valid start wins");
}

#[test]
fn latest_valid_start_rejects_bad_bounds() {
    let err =
        find_latest_valid_start_date(&[], 0, date(2026, 4, 1), date(2026, 6, 1)).unwrap_err();
    assert!(matches!(err, StayError::InvalidBounds(_)));

    let err =
        find_latest_valid_start_date(&[], 5, date(2026, 6, 1), date(2026, 4, 1)).unwrap_err();
    assert!(matches!(err, StayError::InvalidBounds(_)));
}

// ── calculate_max_consecutive_days ──────────────────────────────────────────

#[test]
fn max_consecutive_with_no_trips_is_ninety() {
    let max = calculate_max_consecutive_days(&[], date(2026, 4, 1)).unwrap();
    assert_eq!(max, 90);
}

#[test]
fn max_consecutive_shrinks_by_recent_usage() {
    // 60 days used Jan 1 - Mar 1; from Apr 1 only 30 more fit before the
    // window fills (nothing rolls out until late June).
    let existing = vec![trip("a", "FR", (2026, 1, 1), (2026, 3, 1))];

    let max = calculate_max_consecutive_days(&existing, date(2026, 4, 1)).unwrap();
    assert_eq!(max, 30);
}

#[test]
fn max_consecutive_zero_when_window_already_full() {
    let existing = vec![trip("full", "DE", (2026, 1, 1), (2026, 3, 31))];
    let max = calculate_max_consecutive_days(&existing, date(2026, 4, 1)).unwrap();
    assert_eq!(max, 0);
}

// ── get_next_reset_date ─────────────────────────────────────────────────────

#[test]
fn next_reset_is_180_days_after_earliest_counted_start() {
    let trips = vec![
        trip("a", "FR", (2026, 2, 1), (2026, 2, 10)),
        trip("b", "IT", (2026, 3, 1), (2026, 3, 5)),
    ];

    let reset = get_next_reset_date(&trips, date(2026, 4, 1)).unwrap();
    assert_eq!(reset, Some(date(2026, 7, 31)), "Feb 1 + 180 days");
}

#[test]
fn next_reset_none_when_nothing_is_counted() {
    // Trip ended long before the window.
    let trips = vec![trip("old", "FR", (2025, 1, 1), (2025, 1, 20))];
    let reset = get_next_reset_date(&trips, date(2026, 6, 1)).unwrap();
    assert_eq!(reset, None);
}

#[test]
fn next_reset_on_empty_set_is_none() {
    assert_eq!(get_next_reset_date(&[], date(2026, 6, 1)).unwrap(), None);
}
