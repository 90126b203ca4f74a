//! Typed view of a poll tape document.
//!
//! OCR output is not trusted to be complete: every field defaults, and
//! counters are kept as text whether the scan produced `"12"` or `12`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// A section or list the scanner wrote as `null` reads as empty.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A scanned election poll tape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollTape {
    #[serde(deserialize_with = "nullable")]
    pub election_header: ElectionHeader,
    #[serde(deserialize_with = "nullable")]
    pub voting_system: VotingSystem,
    /// Printed before the first ballot.
    #[serde(deserialize_with = "nullable")]
    pub open_poll_report: PollReport,
    /// Printed after the last ballot.
    #[serde(deserialize_with = "nullable")]
    pub close_poll_report: PollReport,
    #[serde(deserialize_with = "nullable")]
    pub tally_report: TallyReport,
    /// Contests in tape order.
    #[serde(deserialize_with = "nullable")]
    pub contests: Vec<Contest>,
    #[serde(deserialize_with = "nullable")]
    pub ballot_counts: BallotCounts,
}

/// Election type, date and where the tape was printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionHeader {
    /// `General`, `Primary`, ...
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub election_type: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "nullable")]
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(deserialize_with = "lenient_text")]
    pub county: String,
    /// Two-letter postal code.
    #[serde(deserialize_with = "lenient_text")]
    pub state: String,
    #[serde(deserialize_with = "nullable")]
    pub precinct: Precinct,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Precinct {
    #[serde(deserialize_with = "lenient_text")]
    pub township: String,
    /// Precinct number as printed.
    #[serde(deserialize_with = "lenient_text")]
    pub number: String,
}

/// Tabulator identification printed at the top of the tape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingSystem {
    #[serde(deserialize_with = "lenient_text")]
    pub manufacturer: String,
    #[serde(deserialize_with = "lenient_text")]
    pub model: String,
    #[serde(deserialize_with = "lenient_text")]
    pub serial_number: String,
    /// Firmware version string as printed.
    #[serde(deserialize_with = "lenient_text")]
    pub firmware_version: String,
}

/// Counters printed when the polls open or close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollReport {
    /// Ballots counted this election.
    #[serde(deserialize_with = "lenient_text")]
    pub public_counter: String,
    /// Lifetime ballot count of the tabulator.
    #[serde(deserialize_with = "lenient_text")]
    pub protective_counter: String,
    #[serde(deserialize_with = "lenient_text")]
    pub ballots_cast: String,
    /// Stored instant.
    #[serde(deserialize_with = "lenient_text")]
    pub timestamp: String,
}

/// Results report header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyReport {
    #[serde(deserialize_with = "lenient_text")]
    pub report_type: String,
    /// Stored instant.
    #[serde(deserialize_with = "lenient_text")]
    pub timestamp: String,
}

/// One race on the ballot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contest {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// How many candidates a voter may pick.
    #[serde(deserialize_with = "lenient_text")]
    pub vote_for: String,
    #[serde(deserialize_with = "nullable")]
    pub candidates: Vec<Candidate>,
    #[serde(deserialize_with = "nullable")]
    pub metadata: ContestMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub party: String,
    /// Vote count as text.
    #[serde(deserialize_with = "lenient_text")]
    pub votes: String,
}

/// Per-contest counters other than candidate votes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestMetadata {
    #[serde(deserialize_with = "lenient_text")]
    pub overvotes: String,
    #[serde(deserialize_with = "lenient_text")]
    pub undervotes: String,
    #[serde(deserialize_with = "lenient_text")]
    pub write_ins: String,
}

/// Ballot totals at the foot of the tape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotCounts {
    #[serde(deserialize_with = "lenient_text")]
    pub total_ballots: String,
    #[serde(deserialize_with = "lenient_text")]
    pub ballots_counted: String,
    #[serde(deserialize_with = "lenient_text")]
    pub ballots_rejected: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use polltape_doc::Document;
    use serde_json::json;

    #[test]
    fn test_partial_scan_defaults() {
        let tape: PollTape = serde_json::from_value(json!({
            "election_header": {"type": "General", "date": "2024-11-05"}
        }))
        .unwrap();
        assert_eq!(tape.election_header.election_type, "General");
        assert!(tape.contests.is_empty());
        assert_eq!(tape.ballot_counts, BallotCounts::default());
    }

    #[test]
    fn test_numbers_kept_as_text() {
        let tape: PollTape = serde_json::from_value(json!({
            "contests": [{
                "name": "Mayor",
                "vote_for": 1,
                "candidates": [{"name": "A", "votes": 120}, {"name": "B", "votes": null}]
            }],
            "election_header": {"location": {"precinct": {"number": 14}}}
        }))
        .unwrap();
        assert_eq!(tape.contests[0].vote_for, "1");
        assert_eq!(tape.contests[0].candidates[0].votes, "120");
        assert_eq!(tape.contests[0].candidates[1].votes, "");
        assert_eq!(tape.election_header.location.precinct.number, "14");
    }

    #[test]
    fn test_null_sections_default() {
        let tape: PollTape = serde_json::from_value(json!({
            "election_header": {"type": "General", "location": null},
            "contests": null,
            "close_poll_report": null,
            "ballot_counts": {"total_ballots": "410"}
        }))
        .unwrap();
        assert_eq!(tape.election_header.election_type, "General");
        assert_eq!(tape.election_header.location, Location::default());
        assert!(tape.contests.is_empty());
        assert_eq!(tape.close_poll_report, PollReport::default());
        assert_eq!(tape.ballot_counts.total_ballots, "410");
    }

    #[test]
    fn test_null_candidates_default() {
        let tape: PollTape = serde_json::from_value(json!({
            "contests": [{"name": "Mayor", "candidates": null, "metadata": null}]
        }))
        .unwrap();
        assert_eq!(tape.contests[0].name, "Mayor");
        assert!(tape.contests[0].candidates.is_empty());
    }

    #[test]
    fn test_document_model_conversion() {
        let doc = Document::from_value(json!({
            "election_header": {"type": "Primary", "date": "2024-03-05"},
            "ballot_counts": {"total_ballots": "410"}
        }));
        let tape: PollTape = doc.to_model().unwrap();
        assert_eq!(tape.ballot_counts.total_ballots, "410");

        let back = Document::from_model(&tape).unwrap();
        assert_eq!(back.to_value()["election_header"]["type"], "Primary");
        assert_eq!(back.to_value()["ballot_counts"]["ballots_counted"], "");
    }
}
