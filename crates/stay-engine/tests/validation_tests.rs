//! Tests for structural trip-set validation.

use chrono::NaiveDate;
use stay_engine::types::Severity;
use stay_engine::window::validate_trips;
use stay_engine::Trip;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn trip(id: &str, country: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Trip {
    Trip::new(
        id,
        country,
        date(start.0, start.1, start.2),
        date(end.0, end.1, end.2),
    )
    .unwrap()
}

#[test]
fn clean_trip_set_has_no_findings() {
    let trips = vec![
        trip("a", "FR", (2026, 1, 1), (2026, 1, 10)),
        trip("b", "IT", (2026, 2, 1), (2026, 2, 10)),
    ];

    let report = validate_trips(&trips);

    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn empty_trip_set_is_valid() {
    let report = validate_trips(&[]);
    assert!(report.is_valid, "no trips is a valid zero-usage input");
}

#[test]
fn reversed_dates_are_an_error() {
    let broken = Trip {
        id: "x".to_string(),
        country_code: "FR".to_string(),
        start_date: date(2026, 3, 10),
        end_date: date(2026, 3, 1),
        days: 0,
    };

    let report = validate_trips(&[broken]);

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "end_date");
    assert_eq!(report.errors[0].severity, Severity::Error);
    assert_eq!(report.errors[0].trip_id.as_deref(), Some("x"));
}

#[test]
fn empty_id_is_an_error() {
    let nameless = Trip {
        id: String::new(),
        country_code: "FR".to_string(),
        start_date: date(2026, 3, 1),
        end_date: date(2026, 3, 5),
        days: 5,
    };

    let report = validate_trips(&[nameless]);

    assert!(!report.is_valid);
    assert_eq!(report.errors[0].field, "id");
}

#[test]
fn duplicate_ids_are_an_error() {
    let trips = vec![
        trip("dup", "FR", (2026, 1, 1), (2026, 1, 5)),
        trip("dup", "IT", (2026, 2, 1), (2026, 2, 5)),
    ];

    let report = validate_trips(&trips);

    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|e| e.message.contains("'dup'")));
}

#[test]
fn empty_country_code_is_only_a_warning() {
    let trips = vec![trip("a", "", (2026, 1, 1), (2026, 1, 5))];

    let report = validate_trips(&trips);

    assert!(report.is_valid, "warnings never invalidate the set");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, "country_code");
}

#[test]
fn stored_days_mismatch_is_a_warning() {
    let mut wrong = trip("a", "FR", (2026, 1, 1), (2026, 1, 10));
    wrong.days = 99;

    let report = validate_trips(&[wrong]);

    assert!(report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.field == "days" && w.message.contains("99")));
}

#[test]
fn unset_days_field_is_not_flagged() {
    // Deserialized input without a days field defaults to 0.
    let mut unset = trip("a", "FR", (2026, 1, 1), (2026, 1, 10));
    unset.days = 0;

    let report = validate_trips(&[unset]);
    assert!(report.warnings.is_empty());
}

#[test]
fn stay_longer_than_ninety_days_is_a_warning() {
    let trips = vec![trip("long", "ES", (2026, 1, 1), (2026, 4, 10))];

    let report = validate_trips(&trips);

    assert!(report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("exceeds the 90-day ceiling")));
}

#[test]
fn overlapping_trips_are_a_warning() {
    let trips = vec![
        trip("a", "FR", (2026, 3, 1), (2026, 3, 10)),
        trip("b", "IT", (2026, 3, 8), (2026, 3, 12)),
    ];

    let report = validate_trips(&trips);

    assert!(report.is_valid, "overlap is legitimate multi-country input");
    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("share 3 day(s)")));
}

#[test]
fn overlap_between_non_adjacent_trips_is_found() {
    // A long first trip overlaps the third; the second sits in between.
    let trips = vec![
        trip("a", "FR", (2026, 1, 1), (2026, 3, 31)),
        trip("b", "IT", (2026, 1, 10), (2026, 1, 12)),
        trip("c", "DE", (2026, 3, 1), (2026, 3, 5)),
    ];

    let report = validate_trips(&trips);

    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("'a'") && w.message.contains("'c'")));
}

#[test]
fn back_to_back_trips_are_a_warning() {
    let trips = vec![
        trip("a", "FR", (2026, 3, 1), (2026, 3, 10)),
        trip("b", "IT", (2026, 3, 11), (2026, 3, 15)),
    ];

    let report = validate_trips(&trips);

    assert!(report.is_valid);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("starts the day after")));
}

#[test]
fn all_issues_reported_in_one_pass() {
    let reversed = Trip {
        id: "r".to_string(),
        country_code: "FR".to_string(),
        start_date: date(2026, 3, 10),
        end_date: date(2026, 3, 1),
        days: 0,
    };
    let trips = vec![
        reversed,
        trip("dup", "", (2026, 1, 1), (2026, 1, 5)),
        trip("dup", "IT", (2026, 2, 1), (2026, 2, 5)),
    ];

    let report = validate_trips(&trips);

    // One reversed-range error, one duplicate-id error, one country warning:
    // validation never stops at the first problem.
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.warnings.len(), 1);
}
