//! Timestamp fields edited through separate date and time components.
//!
//! A poll report stores one instant, but the review screen shows it as a
//! `MM/DD/YYYY` date and an `HH:MM AM/PM` time. Committing one component
//! rewrites only that part of the stored instant:
//!
//! - a date commit keeps the time of day, seconds and zone offset
//! - a time commit keeps the date, seconds and zone offset
//! - a blank commit keeps everything

use crate::codec::stored_text;
use crate::{FieldCodec, FormatError, Parsed};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Timelike,
};
use polltape_doc::{Leaf, Node};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DATE_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("static pattern")
});

static TIME_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2}):([0-9]{2})\s(AM|PM)$").expect("static pattern")
});

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const NAIVE_SPACED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Which half of a timestamp a commit edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampComponent {
    /// The calendar date, entered as `MM/DD/YYYY`.
    Date,
    /// The time of day, entered as `HH:MM AM/PM`.
    Time,
}

impl fmt::Display for TimestampComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampComponent::Date => f.write_str("date"),
            TimestampComponent::Time => f.write_str("time"),
        }
    }
}

impl FromStr for TimestampComponent {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(TimestampComponent::Date),
            "time" => Ok(TimestampComponent::Time),
            _ => Err(FormatError::pattern("component", s, "`date` or `time`")),
        }
    }
}

/// A stored instant, remembering the textual form it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredInstant {
    /// RFC 3339 with an offset. `zulu` records whether UTC was spelled `Z`.
    Zoned {
        /// The instant in its stored offset.
        at: DateTime<FixedOffset>,
        /// UTC was written as `Z` rather than `+00:00`.
        zulu: bool,
    },
    /// A local timestamp with no offset. `spaced` records whether date and
    /// time were separated by a space rather than `T`.
    Naive {
        /// The wall-clock reading.
        at: NaiveDateTime,
        /// Separated by `' '` rather than `'T'`.
        spaced: bool,
    },
}

impl StoredInstant {
    /// Parse stored text.
    ///
    /// Accepts RFC 3339 (`2024-03-10T14:30:00-05:00`, `...Z`) and naive
    /// `2024-03-10T14:30:00` or `2024-03-10 14:30:00`, with optional
    /// fractional seconds.
    pub fn parse(stored: &str) -> Result<Self, FormatError> {
        let text = stored.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            let zulu = text.ends_with('Z') || text.ends_with('z');
            return Ok(StoredInstant::Zoned { at, zulu });
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(text, NAIVE_FORMAT) {
            return Ok(StoredInstant::Naive { at, spaced: false });
        }
        NaiveDateTime::parse_from_str(text, NAIVE_SPACED_FORMAT)
            .map(|at| StoredInstant::Naive { at, spaced: true })
            .map_err(|_| FormatError::invalid_instant(stored))
    }

    /// Read the instant stored at a field.
    ///
    /// A missing or non-text value cannot have a component merged into it.
    pub fn from_node(node: Option<&Node>) -> Result<Self, FormatError> {
        let node = node.ok_or_else(|| FormatError::invalid_instant(""))?;
        Self::parse(stored_text(node)?)
    }

    /// Wall-clock date and time in the stored offset.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            StoredInstant::Zoned { at, .. } => at.naive_local(),
            StoredInstant::Naive { at, .. } => *at,
        }
    }

    /// Same form and offset, different wall-clock reading.
    pub fn with_local(&self, local: NaiveDateTime) -> Result<Self, FormatError> {
        match self {
            StoredInstant::Zoned { at, zulu } => at
                .offset()
                .from_local_datetime(&local)
                .single()
                .map(|at| StoredInstant::Zoned { at, zulu: *zulu })
                .ok_or_else(|| FormatError::invalid_instant(local.to_string())),
            StoredInstant::Naive { spaced, .. } => Ok(StoredInstant::Naive {
                at: local,
                spaced: *spaced,
            }),
        }
    }

    /// Render in the same textual form it was read from.
    pub fn to_stored_string(&self) -> String {
        match self {
            StoredInstant::Zoned { at, zulu } => at.to_rfc3339_opts(SecondsFormat::AutoSi, *zulu),
            StoredInstant::Naive { at, spaced: false } => at.format(NAIVE_FORMAT).to_string(),
            StoredInstant::Naive { at, spaced: true } => {
                at.format(NAIVE_SPACED_FORMAT).to_string()
            }
        }
    }

    /// Replace the calendar date from a `MM/DD/YYYY` entry.
    pub fn merge_date(&self, text: &str) -> Result<Self, FormatError> {
        let date = parse_date_component(text)?;
        let local = self.local();
        self.with_local(NaiveDateTime::new(date, local.time()))
    }

    /// Replace hour and minute from an `HH:MM AM/PM` entry.
    pub fn merge_time(&self, text: &str) -> Result<Self, FormatError> {
        let (hour, minute) = parse_time_component(text)?;
        let local = self.local();
        let time = NaiveTime::from_hms_nano_opt(hour, minute, local.second(), local.nanosecond())
            .ok_or_else(|| FormatError::out_of_range("time", text, "seconds"))?;
        self.with_local(NaiveDateTime::new(local.date(), time))
    }
}

impl fmt::Display for StoredInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored_string())
    }
}

fn parse_date_component(text: &str) -> Result<NaiveDate, FormatError> {
    let caps = DATE_COMPONENT
        .captures(text)
        .ok_or_else(|| FormatError::pattern("date", text, "MM/DD/YYYY"))?;
    let number = |i: usize| {
        caps[i]
            .parse::<u32>()
            .map_err(|_| FormatError::pattern("date", text, "MM/DD/YYYY"))
    };
    let (month, day, year) = (number(1)?, number(2)?, number(3)?);

    if !(1..=12).contains(&month) {
        return Err(FormatError::out_of_range("date", text, "month must be 01-12"));
    }
    if !(1..=31).contains(&day) {
        return Err(FormatError::out_of_range("date", text, "day must be 01-31"));
    }
    // Four digits always fit in i32.
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| FormatError::nonexistent_date(text))
}

/// Parse `HH:MM AM/PM` into a 24-hour `(hour, minute)`.
fn parse_time_component(text: &str) -> Result<(u32, u32), FormatError> {
    let caps = TIME_COMPONENT
        .captures(text)
        .ok_or_else(|| FormatError::pattern("time", text, "HH:MM AM/PM"))?;
    let number = |i: usize| {
        caps[i]
            .parse::<u32>()
            .map_err(|_| FormatError::pattern("time", text, "HH:MM AM/PM"))
    };
    let (hour, minute) = (number(1)?, number(2)?);
    let pm = caps[3].eq_ignore_ascii_case("PM");

    if !(1..=12).contains(&hour) {
        return Err(FormatError::out_of_range("time", text, "hour must be 1-12"));
    }
    if minute > 59 {
        return Err(FormatError::out_of_range("time", text, "minute must be 00-59"));
    }

    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    Ok((hour, minute))
}

/// The two display strings of a timestamp field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampDisplay {
    /// `MM/DD/YYYY`.
    pub date: String,
    /// `HH:MM AM/PM`.
    pub time: String,
}

impl TimestampDisplay {
    /// Split an instant into its display components, in its stored offset.
    pub fn of(instant: &StoredInstant) -> Self {
        let local = instant.local();
        Self {
            date: local.format("%m/%d/%Y").to_string(),
            time: local.format("%I:%M %p").to_string(),
        }
    }

    /// The component shown for `component`.
    pub fn component(&self, component: TimestampComponent) -> &str {
        match component {
            TimestampComponent::Date => &self.date,
            TimestampComponent::Time => &self.time,
        }
    }
}

/// Codec for one component of a timestamp field.
///
/// # Examples
///
/// ```
/// use polltape_codec::{FieldCodec, Parsed, TimestampCodec, TimestampComponent};
/// use polltape_doc::{Leaf, Node};
///
/// let stored = Node::text("2024-03-10T14:30:00");
/// let codec = TimestampCodec::new(TimestampComponent::Date);
///
/// let parsed = codec.parse("12/25/2024", Some(&stored)).unwrap();
/// assert_eq!(parsed, Parsed::Replace(Leaf::text("2024-12-25T14:30:00")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampCodec {
    component: TimestampComponent,
}

impl TimestampCodec {
    /// Codec editing `component`.
    pub const fn new(component: TimestampComponent) -> Self {
        Self { component }
    }

    /// The component this codec edits.
    pub fn component(&self) -> TimestampComponent {
        self.component
    }
}

impl FieldCodec for TimestampCodec {
    type Display = TimestampDisplay;

    fn parse(&self, text: &str, previous: Option<&Node>) -> Result<Parsed, FormatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Parsed::Keep);
        }

        let previous = StoredInstant::from_node(previous)?;
        let merged = match self.component {
            TimestampComponent::Date => previous.merge_date(text)?,
            TimestampComponent::Time => previous.merge_time(text)?,
        };
        Ok(Parsed::Replace(Leaf::text(merged.to_stored_string())))
    }

    fn format(&self, stored: &Node) -> Result<TimestampDisplay, FormatError> {
        StoredInstant::from_node(Some(stored)).map(|instant| TimestampDisplay::of(&instant))
    }
}
