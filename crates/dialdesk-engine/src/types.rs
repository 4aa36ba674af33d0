//! Event and outcome types for the join engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dialdesk_records::RecordId;
use dialdesk_telephony::CallId;

/// One lifecycle status notification from the telephony provider. A call
/// produces several (initiated, ringing, answered, completed), each
/// delivered independently with no ordering guarantee.
#[derive(Debug, Clone, Deserialize)]
pub struct CallEvent {
    pub call_id: CallId,
    pub status: String,
    pub direction: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// A recording-ready notification. Arrives once per recording; the call id
/// it carries is usually the prospect (child) leg, not the leg the call was
/// correlated under.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingEvent {
    pub call_id: CallId,
    pub recording_id: String,
    pub recording_url: String,
    pub duration: Option<u32>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// The agent's form submission after a call. All optional fields arrive as
/// raw strings; malformed values are dropped during the join, they never
/// reject the submission.
#[derive(Debug, Clone, Deserialize)]
pub struct DispositionSubmission {
    pub record_id: RecordId,
    pub call_id: Option<CallId>,
    pub disposition_code: Option<String>,
    pub notes: Option<String>,
    pub motivation: Option<String>,
    pub next_action_date: Option<String>,
    pub asking_price: Option<String>,
}

/// What the join produced. `warnings` carries the absorbed sub-failures
/// (task creation, audit write) for the caller's logs; the activity itself
/// was created whenever this struct exists.
#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub activity_id: RecordId,
    pub duration_seconds: Option<u32>,
    pub recording_url: Option<String>,
    pub task_id: Option<RecordId>,
    pub warnings: Vec<String>,
}

/// Result of processing one recording event. `resolved` is true only when
/// a record was found *and* its recording field was updated; an event whose
/// call id resolves nowhere is discarded, not retried.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub resolved: bool,
    pub record_id: Option<RecordId>,
}

/// Parse an agent-entered date (`YYYY-MM-DD`). Anything else is dropped.
pub(crate) fn parse_action_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse an agent-entered currency amount, tolerating `$` and thousands
/// separators. Anything unparseable is dropped.
pub(crate) fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Treat whitespace-only strings as absent.
pub(crate) fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_parsing_tolerates_formatting() {
        assert_eq!(parse_currency("$325,000"), Some(325000.0));
        assert_eq!(parse_currency(" 185000.50 "), Some(185000.50));
        assert_eq!(parse_currency("ask me later"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn action_date_parsing_is_strict() {
        assert_eq!(
            parse_action_date("2026-09-01"),
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
        assert_eq!(parse_action_date("09/01/2026"), None);
        assert_eq!(parse_action_date("next tuesday"), None);
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&None), None);
        assert_eq!(
            non_empty(&Some(" left voicemail ".to_string())),
            Some("left voicemail".to_string())
        );
    }
}
