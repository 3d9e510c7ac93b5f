//! Integration tests for course update defaults and date validation.
//!
//! Exercises the public API the way a form handler would: build a record,
//! apply user edits, validate, and report the keyed error.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use coursedesk_core::course_update::{
    CourseUpdate, CourseUpdatePatch, UpdateDate, UpdateValidationError,
};
use coursedesk_core::date_format::{CanonicalDateFormat, DateFormatter, FixedClock};
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// A formatter that renders every date as ISO, to prove validation follows
/// whatever formatter it is given.
struct IsoFormat;

impl DateFormatter for IsoFormat {
    fn format(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    fn parse(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }
}

// ---------------------------------------------------------------------------
// Test: defaults
// ---------------------------------------------------------------------------

#[test]
fn new_update_defaults_to_today_and_validates() {
    let update =
        CourseUpdate::with_defaults(&FixedClock(day(2024, 11, 2)), &CanonicalDateFormat);

    assert_eq!(update.date, Some(UpdateDate::from("November 2, 2024")));
    assert_eq!(update.content, "");
    assert!(!update.push_notification_enabled);
    assert!(!update.push_notification_selected);
    assert!(update.validate(&CanonicalDateFormat).is_ok());
}

// ---------------------------------------------------------------------------
// Test: form edits followed by validation
// ---------------------------------------------------------------------------

#[test]
fn user_edits_with_bad_date_report_date_required() {
    let mut update =
        CourseUpdate::with_defaults(&FixedClock(day(2024, 3, 5)), &CanonicalDateFormat);
    let patch: CourseUpdatePatch = serde_json::from_value(json!({
        "date": "2024-03-05",
        "content": "<p>Midterm moved</p>",
        "pushNotificationSelected": true,
    }))
    .expect("patch should deserialize");

    update.apply(patch);

    let err = update
        .validate(&CanonicalDateFormat)
        .expect_err("ISO text is not canonical");
    assert_matches!(err, UpdateValidationError::DateRequired);
    assert_eq!(
        serde_json::to_value(err).expect("error should serialize"),
        json!({ "date_required": "This field must contain a valid date." })
    );
    assert_eq!(update.content, "<p>Midterm moved</p>");
    assert!(update.push_notification_selected);
}

#[test]
fn record_from_json_with_null_date_is_rejected() {
    let update: CourseUpdate = serde_json::from_value(json!({
        "date": null,
        "content": "Hello",
    }))
    .expect("record should deserialize");

    assert_eq!(update.date, None);
    assert_matches!(
        update.validate(&CanonicalDateFormat),
        Err(UpdateValidationError::DateRequired)
    );
}

#[test]
fn date_value_is_accepted_and_displayed_canonically() {
    let mut update =
        CourseUpdate::with_defaults(&FixedClock(day(2024, 1, 1)), &CanonicalDateFormat);
    update.date = Some(UpdateDate::from(day(2025, 7, 4)));

    assert!(update.validate(&CanonicalDateFormat).is_ok());
    assert_eq!(
        update.display_date(&CanonicalDateFormat).as_deref(),
        Some("July 4, 2025")
    );
}

// ---------------------------------------------------------------------------
// Test: injected formatter
// ---------------------------------------------------------------------------

#[test]
fn validation_follows_the_injected_formatter() {
    let update = CourseUpdate::with_defaults(&FixedClock(day(2024, 3, 5)), &IsoFormat);

    assert_eq!(update.date, Some(UpdateDate::from("2024-03-05")));
    assert!(update.validate(&IsoFormat).is_ok());
    assert!(update.validate(&CanonicalDateFormat).is_err());
}
