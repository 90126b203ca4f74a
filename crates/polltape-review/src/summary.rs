//! The lines shown on the review screen.

use crate::PollTape;
use polltape_codec::{
    long_date, parse_calendar_date, weekday_name, StoredInstant, TimestampDisplay,
};
use polltape_doc::{get_at_path, path, Document, Node, Path};
use serde::Serialize;
use std::fmt;

/// Human-readable summary of a poll tape.
///
/// Missing or unreadable values render as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    /// `General`, `Primary`, ...
    pub election_type: String,
    /// `November 5, 2024`.
    pub long_date: String,
    /// The stored `YYYY-MM-DD` text as scanned.
    pub raw_date: String,
    pub county: String,
    pub state: String,
    pub township: String,
    pub precinct_number: String,
    /// `Tuesday`.
    pub weekday: String,
    /// `MM/DD/YYYY HH:MM AM/PM`.
    pub polls_opened: String,
    /// Same form as `polls_opened`.
    pub polls_closed: String,
}

/// Scalar text at a node; containers and absent nodes read as empty.
fn leaf_text(node: Option<&Node>) -> String {
    node.and_then(Node::as_leaf)
        .map(|leaf| leaf.to_display_string())
        .unwrap_or_default()
}

fn instant_text(stored: &str) -> String {
    match StoredInstant::parse(stored) {
        Ok(instant) => {
            let display = TimestampDisplay::of(&instant);
            format!("{} {}", display.date, display.time)
        }
        Err(_) => String::new(),
    }
}

impl ReviewSummary {
    /// Summarize a typed poll tape.
    pub fn from_tape(tape: &PollTape) -> Self {
        let header = &tape.election_header;
        Self::assemble(
            header.election_type.clone(),
            header.date.clone(),
            header.location.county.clone(),
            header.location.state.clone(),
            header.location.precinct.township.clone(),
            header.location.precinct.number.clone(),
            &tape.open_poll_report.timestamp,
            &tape.close_poll_report.timestamp,
        )
    }

    /// Summarize a document snapshot.
    ///
    /// Each line is read on its own, so a section that is missing, `null` or
    /// the wrong shape only empties the lines that come from it.
    pub fn from_document(doc: &Document) -> Self {
        let text = |at: Path| leaf_text(get_at_path(doc, &at));
        Self::assemble(
            text(path!("election_header", "type")),
            text(path!("election_header", "date")),
            text(path!("election_header", "location", "county")),
            text(path!("election_header", "location", "state")),
            text(path!("election_header", "location", "precinct", "township")),
            text(path!("election_header", "location", "precinct", "number")),
            &text(path!("open_poll_report", "timestamp")),
            &text(path!("close_poll_report", "timestamp")),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        election_type: String,
        raw_date: String,
        county: String,
        state: String,
        township: String,
        precinct_number: String,
        opened: &str,
        closed: &str,
    ) -> Self {
        let date = parse_calendar_date(&raw_date).ok();
        Self {
            election_type,
            long_date: date.map(long_date).unwrap_or_default(),
            raw_date,
            county,
            state,
            township,
            precinct_number,
            weekday: date.map(weekday_name).unwrap_or_default(),
            polls_opened: instant_text(opened),
            polls_closed: instant_text(closed),
        }
    }

    /// Rendered lines in screen order.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.election_type.clone(),
            self.long_date.clone(),
            format!("Election Date: {}", self.raw_date),
            format!("{}, {}", self.county, self.state),
            format!("{}, {}", self.township, self.precinct_number),
            self.weekday.clone(),
            format!("Polls Opened: {}", self.polls_opened),
            format!("Polls Closed: {}", self.polls_closed),
        ]
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
