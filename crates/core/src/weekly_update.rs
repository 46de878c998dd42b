//! Weekly status update scheduling rules.
//!
//! Project managers submit one update per project per week. On the reminder
//! weekday managers with a missing update are reminded; on the following day
//! the still-missing updates are escalated to the department chain.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How week numbers are assigned to dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekNumbering {
    /// ISO-8601 weeks (Monday start, week 1 contains the first Thursday).
    #[default]
    Iso,
    /// Sunday-start weeks counted from January 1st:
    /// `ceil((day_of_year + jan1_weekday + 1) / 7)`.
    Legacy,
}

impl WeekNumbering {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "iso" => Ok(Self::Iso),
            "legacy" => Ok(Self::Legacy),
            _ => Err(format!(
                "Invalid week numbering '{s}'. Must be one of: iso, legacy"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iso => "iso",
            Self::Legacy => "legacy",
        }
    }
}

/// A (year, week) pair identifying a reporting week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingWeek {
    pub year: i32,
    pub week_number: i32,
}

/// Reporting week of `date` under the given numbering.
pub fn reporting_week(date: NaiveDate, numbering: WeekNumbering) -> ReportingWeek {
    match numbering {
        WeekNumbering::Iso => {
            let iso = date.iso_week();
            ReportingWeek {
                year: iso.year(),
                week_number: iso.week() as i32,
            }
        }
        WeekNumbering::Legacy => ReportingWeek {
            year: date.year(),
            week_number: legacy_week_number(date),
        },
    }
}

/// The legacy formula, kept for parity with week numbers already stored.
pub fn legacy_week_number(date: NaiveDate) -> i32 {
    let day_of_year = date.ordinal0() as i32;
    let jan1_weekday = date
        .with_ordinal(1)
        .map(|jan1| jan1.weekday().num_days_from_sunday() as i32)
        .unwrap_or(0);
    // Integer ceil of (n / 7) for positive n.
    (day_of_year + jan1_weekday + 1 + 6) / 7
}

/// What the weekly job should do on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeklyPhase {
    Idle,
    /// Remind managers whose update is missing.
    Remind,
    /// Escalate updates still missing after the reminder day.
    Escalate,
}

impl WeeklyPhase {
    pub fn for_date(date: NaiveDate, reminder_weekday: Weekday) -> Self {
        let weekday = date.weekday();
        if weekday == reminder_weekday {
            Self::Remind
        } else if weekday == reminder_weekday.succ() {
            Self::Escalate
        } else {
            Self::Idle
        }
    }

    /// The date whose reporting week this phase acts on.
    ///
    /// Escalation looks back at the reminder day so a week boundary falling
    /// between the two days does not shift the target week.
    pub fn reference_date(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Escalate => date - Duration::days(1),
            Self::Idle | Self::Remind => date,
        }
    }
}

/// Parse a weekday name such as `fri` or `Friday`.
pub fn parse_weekday(s: &str) -> Result<Weekday, String> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| format!("Invalid weekday '{s}'"))
}

pub fn reminder_message(project_title: &str, week: ReportingWeek) -> String {
    format!(
        "Reminder: the weekly update for project \"{project_title}\" (week {} of {}) has not been submitted yet.",
        week.week_number, week.year
    )
}

pub fn escalation_message(project_title: &str, week: ReportingWeek) -> String {
    format!(
        "Escalation: the weekly update for project \"{project_title}\" (week {} of {}) is overdue.",
        week.week_number, week.year
    )
}
