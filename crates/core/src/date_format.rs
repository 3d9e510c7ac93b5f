//! Canonical date formatting ("Month D, YYYY") and the clock used for defaults.
//!
//! Both are traits so that course-update defaults and validation can be
//! exercised without touching the wall clock or the process locale.

use chrono::{Local, NaiveDate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `strftime` pattern for the canonical display form, e.g. `March 5, 2024`.
pub const CANONICAL_DATE_FORMAT: &str = "%B %-d, %Y";

/// Fallback patterns accepted when reading a date back in.
///
/// The canonical pattern comes first; `%d` accepts one or two digits when
/// parsing.
const PARSE_FORMATS: &[&str] = &["%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

/// Converts between calendar dates and their display text.
pub trait DateFormatter {
    /// Render `date` in display form.
    fn format(&self, date: NaiveDate) -> String;

    /// Read a date from free text, leniently. Returns `None` if the text does
    /// not name a real calendar date.
    fn parse(&self, text: &str) -> Option<NaiveDate>;

    /// True when `text` parses and formats back to exactly the same string.
    fn round_trips(&self, text: &str) -> bool {
        self.parse(text)
            .map(|date| self.format(date) == text)
            .unwrap_or(false)
    }
}

/// The English "Month D, YYYY" formatter used across course updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalDateFormat;

impl DateFormatter for CanonicalDateFormat {
    fn format(&self, date: NaiveDate) -> String {
        date.format(CANONICAL_DATE_FORMAT).to_string()
    }

    fn parse(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        PARSE_FORMATS
            .iter()
            .find_map(|pattern| NaiveDate::parse_from_str(text, pattern).ok())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "today" for default values.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
