use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::models::meeting::ParticipantRecord;

/// One continuous join-to-leave interval of a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSession {
    pub name: String,
    pub email: Option<String>,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
}

impl ParticipantSession {
    pub fn new(
        name: impl Into<String>,
        join_time: DateTime<Utc>,
        leave_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.into(),
            email: None,
            join_time,
            leave_time,
        }
    }

    /// Build a session from a raw API record.
    ///
    /// Returns `None` when the record has no parseable join time.
    pub fn from_record(record: &ParticipantRecord) -> Option<Self> {
        let join_time = record.join_time.as_deref().and_then(parse_api_timestamp)?;
        let leave_time = record.leave_time.as_deref().and_then(parse_api_timestamp);
        let email = record
            .user_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty() && !email.eq_ignore_ascii_case("n/a"))
            .map(str::to_string);

        Some(Self {
            name: record.name.clone(),
            email,
            join_time,
            leave_time,
        })
    }

    /// Whether this session intersects `[start, end]`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.join_time <= end && self.leave_time.map_or(true, |leave| leave >= start)
    }
}

/// One normalized report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    pub meeting_date: NaiveDate,
    pub meeting_time: NaiveTime,
    pub participant_name: String,
}

impl AttendanceRow {
    pub fn date_label(&self) -> String {
        self.meeting_date.format("%Y-%m-%d").to_string()
    }

    pub fn time_label(&self) -> String {
        self.meeting_time.format("%H:%M").to_string()
    }
}

/// Parse a timestamp as returned by the API.
///
/// Accepts RFC 3339; otherwise the first 19 characters are read as a naive
/// UTC datetime (`YYYY-MM-DDTHH:MM:SS`).
pub fn parse_api_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let prefix = value.get(..19)?;
    NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
