use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Longest look-back accepted, in days
pub const MAX_RANGE_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            TimeUnit::Minutes => 'm',
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
        }
    }
}

/// How far back a report looks, e.g. `2h`, `30m`, `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub value: u32,
    pub unit: TimeUnit,
}

impl TimeRange {
    pub fn new(value: u32, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn to_duration(self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            TimeUnit::Minutes => Duration::minutes(value),
            TimeUnit::Hours => Duration::hours(value),
            TimeUnit::Days => Duration::days(value),
        }
    }

    pub fn hours(self) -> f64 {
        self.to_duration().num_seconds() as f64 / 3600.0
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(1, TimeUnit::Days)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for TimeRange {
    type Err = ReportError;

    // Empty input means one day; a bare number is a count of days
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim().trim_matches('"').trim_matches('\'').to_lowercase();
        if input.is_empty() {
            return Ok(Self::default());
        }

        let invalid = || {
            ReportError::Configuration(format!(
                "Invalid time range '{}'. Expected <number><unit> with unit h, m or d (e.g. 2h, 30m, 1d)",
                input
            ))
        };

        let (digits, unit) = match input.chars().last() {
            Some('h') => (&input[..input.len() - 1], TimeUnit::Hours),
            Some('m') => (&input[..input.len() - 1], TimeUnit::Minutes),
            Some('d') => (&input[..input.len() - 1], TimeUnit::Days),
            _ => (input.as_str(), TimeUnit::Days),
        };

        let value: u32 = digits.trim().parse().map_err(|_| invalid())?;
        if value == 0 {
            return Err(ReportError::Configuration(format!(
                "Time range '{}' selects an empty window",
                input
            )));
        }

        let range = Self::new(value, unit);
        if range.to_duration() > Duration::days(MAX_RANGE_DAYS) {
            return Err(ReportError::Configuration(format!(
                "Time range '{}' is too large (at most {} days)",
                input, MAX_RANGE_DAYS
            )));
        }

        Ok(range)
    }
}

/// The UTC interval `[now - range, now]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of `range` ending at `end`, clamped to the earliest representable instant.
    pub fn ending_at(end: DateTime<Utc>, range: TimeRange) -> Self {
        Self {
            start: end
                .checked_sub_signed(range.to_duration())
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Parameters of one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Meeting ID kept as a string. `None` covers every previous meeting of the account owner.
    pub meeting_id: Option<String>,
    pub time_range: TimeRange,
    pub send_email: bool,
}

impl ReportRequest {
    pub fn new(meeting_id: Option<String>, time_range: TimeRange, send_email: bool) -> Self {
        let meeting_id = meeting_id
            .map(|id| id.trim().replace(' ', ""))
            .filter(|id| !id.is_empty());
        Self {
            meeting_id,
            time_range,
            send_email,
        }
    }

    /// Label used in file names and email bodies.
    pub fn meeting_label(&self) -> &str {
        self.meeting_id.as_deref().unwrap_or("all")
    }
}
