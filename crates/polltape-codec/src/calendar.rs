//! Calendar-date fields (`YYYY-MM-DD`) and their display helpers.
//!
//! A calendar date has no time of day and no zone. Display code must never
//! route it through midnight in some zone, or a reviewer west of UTC sees the
//! previous day; [`local_noon`] is the one sanctioned way to attach a time.

use crate::codec::stored_text;
use crate::{FieldCodec, FormatError, Parsed};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use polltape_doc::{Leaf, Node};
use regex::Regex;
use std::sync::LazyLock;

static CALENDAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static pattern"));

const STORED_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate, FormatError> {
    let text = text.trim();
    if !CALENDAR_DATE.is_match(text) {
        return Err(FormatError::pattern("calendar date", text, "YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(text, STORED_FORMAT).map_err(|_| FormatError::nonexistent_date(text))
}

/// Full weekday name, e.g. `Tuesday`.
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Long-form date, e.g. `November 5, 2024`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// The date at 12:00 local time.
pub fn local_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// The date at 12:00 in `tz`.
///
/// Noon stays on the same calendar day for any offset within ±12 hours.
pub fn local_noon_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local_noon(date)).earliest()
}

/// Display strings for a calendar-date field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDateDisplay {
    /// The stored `YYYY-MM-DD` form.
    pub iso: String,
    /// Full weekday name.
    pub weekday: String,
    /// `Month Day, Year`.
    pub long: String,
}

impl CalendarDateDisplay {
    /// Derive the display strings for a date.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            iso: date.format(STORED_FORMAT).to_string(),
            weekday: weekday_name(date),
            long: long_date(date),
        }
    }
}

/// Codec for `YYYY-MM-DD` fields.
///
/// Accepts only real dates and stores them in canonical form. A blank entry
/// clears the field to the empty string, so a misread date can be removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarDateCodec;

impl FieldCodec for CalendarDateCodec {
    type Display = CalendarDateDisplay;

    fn parse(&self, text: &str, _previous: Option<&Node>) -> Result<Parsed, FormatError> {
        if text.trim().is_empty() {
            return Ok(Parsed::Replace(Leaf::text("")));
        }
        let date = parse_calendar_date(text)?;
        Ok(Parsed::Replace(Leaf::text(
            date.format(STORED_FORMAT).to_string(),
        )))
    }

    fn format(&self, stored: &Node) -> Result<CalendarDateDisplay, FormatError> {
        parse_calendar_date(stored_text(stored)?).map(CalendarDateDisplay::of)
    }
}
