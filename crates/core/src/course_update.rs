//! Course update entries shown on a course's "Updates" page.
//!
//! An update carries a display date, free-form HTML content, and the two
//! push-notification flags. The only rule enforced on it is that the date is
//! present and already in canonical "Month D, YYYY" form (or is a real date
//! value).

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date_format::{CanonicalDateFormat, Clock, DateFormatter, SystemClock};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Error key reported when the date field fails validation.
pub const DATE_REQUIRED_KEY: &str = "date_required";

/// User-facing message for [`UpdateValidationError::DateRequired`].
pub const DATE_REQUIRED_MESSAGE: &str = "This field must contain a valid date.";

// ---------------------------------------------------------------------------
// Date field
// ---------------------------------------------------------------------------

/// The `date` attribute: either display text or a calendar date.
///
/// On the wire the field is always a string. A [`UpdateDate::Date`] is written
/// out in canonical form; anything read back in is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateDate {
    Text(String),
    Date(NaiveDate),
}

impl From<String> for UpdateDate {
    fn from(text: String) -> Self {
        UpdateDate::Text(text)
    }
}

impl From<&str> for UpdateDate {
    fn from(text: &str) -> Self {
        UpdateDate::Text(text.to_string())
    }
}

impl From<NaiveDate> for UpdateDate {
    fn from(date: NaiveDate) -> Self {
        UpdateDate::Date(date)
    }
}

impl From<UpdateDate> for String {
    fn from(date: UpdateDate) -> Self {
        match date {
            UpdateDate::Text(text) => text,
            UpdateDate::Date(date) => CanonicalDateFormat.format(date),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation error
// ---------------------------------------------------------------------------

/// Field-level validation failure for a course update.
///
/// Serializes as a single-entry map, e.g.
/// `{"date_required": "This field must contain a valid date."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UpdateValidationError {
    /// The date is missing, empty, or not in canonical form.
    #[error("This field must contain a valid date.")]
    DateRequired,
}

impl UpdateValidationError {
    /// Key under which the error is reported to the form.
    pub fn key(&self) -> &'static str {
        match self {
            UpdateValidationError::DateRequired => DATE_REQUIRED_KEY,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UpdateValidationError::DateRequired => DATE_REQUIRED_MESSAGE,
        }
    }
}

impl Serialize for UpdateValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key(), self.message())?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One course update entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    /// `None` when the date was explicitly cleared (JSON `null`). A missing
    /// key falls back to today's date.
    #[serde(default = "today_canonical")]
    pub date: Option<UpdateDate>,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "push_notification_enabled")]
    pub push_notification_enabled: bool,
    #[serde(default, alias = "push_notification_selected")]
    pub push_notification_selected: bool,
}

impl CourseUpdate {
    /// A blank update dated today, formatted canonically.
    pub fn with_defaults(clock: &impl Clock, formatter: &impl DateFormatter) -> Self {
        Self {
            date: Some(UpdateDate::Text(formatter.format(clock.today()))),
            content: String::new(),
            push_notification_enabled: false,
            push_notification_selected: false,
        }
    }

    /// Check that the record is well-formed enough to persist.
    ///
    /// Text dates must be non-empty and survive a parse/format round-trip
    /// through `formatter` unchanged. Date values are always accepted.
    pub fn validate(&self, formatter: &impl DateFormatter) -> Result<(), UpdateValidationError> {
        let accepted = match &self.date {
            None => false,
            Some(UpdateDate::Text(text)) => !text.is_empty() && formatter.round_trips(text),
            Some(UpdateDate::Date(_)) => true,
        };

        if accepted {
            Ok(())
        } else {
            tracing::debug!(date = ?self.date, "Course update rejected: invalid date");
            Err(UpdateValidationError::DateRequired)
        }
    }

    /// The date in display form, if it has one.
    ///
    /// Text is returned as stored, without validation.
    pub fn display_date(&self, formatter: &impl DateFormatter) -> Option<String> {
        match &self.date {
            None => None,
            Some(UpdateDate::Text(text)) => Some(text.clone()),
            Some(UpdateDate::Date(date)) => Some(formatter.format(*date)),
        }
    }

    /// Merge caller-supplied attribute changes into the record.
    ///
    /// Fields left unset in the patch are kept. Validation is not run.
    pub fn apply(&mut self, patch: CourseUpdatePatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(enabled) = patch.push_notification_enabled {
            self.push_notification_enabled = enabled;
        }
        if let Some(selected) = patch.push_notification_selected {
            self.push_notification_selected = selected;
        }
    }
}

/// Today's date in canonical form, for records read without a `date` key.
fn today_canonical() -> Option<UpdateDate> {
    Some(UpdateDate::Text(CanonicalDateFormat.format(SystemClock.today())))
}

impl Default for CourseUpdate {
    fn default() -> Self {
        Self::with_defaults(&SystemClock, &CanonicalDateFormat)
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Partial update of a [`CourseUpdate`].
///
/// `date` distinguishes "leave as is" (`None`) from "clear" (`Some(None)`,
/// JSON `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdatePatch {
    #[serde(default, deserialize_with = "explicit_null")]
    pub date: Option<Option<UpdateDate>>,
    pub content: Option<String>,
    #[serde(alias = "push_notification_enabled")]
    pub push_notification_enabled: Option<bool>,
    #[serde(alias = "push_notification_selected")]
    pub push_notification_selected: Option<bool>,
}

/// Deserialize a present key (including `null`) as `Some(..)`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<UpdateDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<UpdateDate>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
