//! Attendance normalization.
//!
//! Sessions are grouped by exact participant name after trimming whitespace.
//! Matching is case-sensitive and there is no fuzzy matching: the same person
//! joining under two display names yields two rows.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::attendance::{AttendanceRow, ParticipantSession};

/// Name used for sessions whose display name is blank
pub const UNKNOWN_PARTICIPANT: &str = "Unknown";

// Aggregate of all sessions sharing one trimmed name
struct ParticipantGroup<'a> {
    name: &'a str,
    first_join: DateTime<Utc>,
    sessions: usize,
}

/// Canonical grouping key for a display name
pub fn normalize_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNKNOWN_PARTICIPANT
    } else {
        trimmed
    }
}

/// Collapse sessions into one row per participant, in local time.
///
/// Each participant is represented by their earliest join. Rows are ordered
/// by that instant, ties broken by name, so any permutation of the input
/// produces the same output.
pub fn normalize_sessions(sessions: &[ParticipantSession], timezone: Tz) -> Vec<AttendanceRow> {
    let mut groups: HashMap<&str, ParticipantGroup<'_>> = HashMap::new();

    for session in sessions {
        let name = normalize_name(&session.name);
        groups
            .entry(name)
            .and_modify(|group| {
                group.first_join = group.first_join.min(session.join_time);
                group.sessions += 1;
            })
            .or_insert(ParticipantGroup {
                name,
                first_join: session.join_time,
                sessions: 1,
            });
    }

    let mut ordered: Vec<ParticipantGroup<'_>> = groups.into_values().collect();
    ordered.sort_by(|a, b| a.first_join.cmp(&b.first_join).then_with(|| a.name.cmp(b.name)));

    let rows: Vec<AttendanceRow> = ordered
        .iter()
        .map(|group| {
            if group.sessions > 1 {
                debug!("Combined {} sessions for {}", group.sessions, group.name);
            }
            to_row(group.name, group.first_join, timezone)
        })
        .collect();

    info!(
        sessions = sessions.len(),
        rows = rows.len(),
        timezone = timezone.name(),
        "Normalized attendance"
    );
    rows
}

fn to_row(name: &str, first_join: DateTime<Utc>, timezone: Tz) -> AttendanceRow {
    let local = first_join.with_timezone(&timezone);
    let time = local.time();
    let meeting_time = time
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time);

    AttendanceRow {
        meeting_date: local.date_naive(),
        meeting_time,
        participant_name: name.to_string(),
    }
}
