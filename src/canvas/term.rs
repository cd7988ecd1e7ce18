use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::America::New_York;
use tracing::warn;

/// Term label used when a course carries no parsable start date.
pub const DEFAULT_TERM: &str = "Fall 2025";

/// Timezone the campus runs on. Canvas reports timestamps in UTC; due dates
/// must be read in this zone so the calendar date never shifts across
/// midnight when the server happens to run in a different timezone.
const CAMPUS_TZ: chrono_tz::Tz = New_York;

/// The academic term in progress right now, in campus-local time.
pub fn current_term() -> String {
    let today = chrono::Utc::now().with_timezone(&CAMPUS_TZ).date_naive();
    term_for(today)
}

fn term_for(date: NaiveDate) -> String {
    let season = match date.month() {
        1..=5 => "Spring",
        6 | 7 => "Summer",
        _ => "Fall",
    };
    format!("{} {}", season, date.year())
}

fn parse_date_or_datetime(input: &str) -> Option<NaiveDate> {
    if input.contains('T') {
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|dt| dt.date_naive())
    } else {
        NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
    }
}

/// Derives the academic term ("Fall 2025") from a course start date.
///
/// Months 1-5 are Spring, 6-7 Summer, 8-12 Fall. Never fails: empty or
/// malformed input yields [`DEFAULT_TERM`].
pub fn resolve_term(start_date: &str) -> String {
    if start_date.is_empty() {
        return DEFAULT_TERM.to_string();
    }

    let Some(date) = parse_date_or_datetime(start_date) else {
        warn!("Could not parse course start date '{}'", start_date);
        return DEFAULT_TERM.to_string();
    };

    term_for(date)
}

/// Formats a course start timestamp as a plain YYYY-MM-DD date, or an empty
/// string when parsing fails.
pub fn format_calendar_date(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    match parse_date_or_datetime(input) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            warn!("Could not format date '{}'", input);
            String::new()
        }
    }
}

/// Formats an assignment due timestamp as the calendar date it falls on in
/// campus-local time.
///
/// Canvas stores "23:59 local" due dates as UTC instants, which can land on
/// the next UTC day. Converting into the campus zone before dropping the
/// time component recovers the date students actually see.
pub fn format_due_date(due_at: &str) -> String {
    if due_at.is_empty() {
        return String::new();
    }

    if !due_at.contains('T') {
        return format_calendar_date(due_at);
    }

    match DateTime::parse_from_rfc3339(due_at) {
        Ok(dt) => dt
            .with_timezone(&CAMPUS_TZ)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string(),
        Err(e) => {
            warn!("Could not parse due date '{}': {}", due_at, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_runs_through_may() {
        assert_eq!(resolve_term("2025-01-06T00:00:00Z"), "Spring 2025");
        assert_eq!(resolve_term("2025-05-31T00:00:00Z"), "Spring 2025");
    }

    #[test]
    fn summer_is_june_and_july() {
        assert_eq!(resolve_term("2025-06-01T00:00:00Z"), "Summer 2025");
        assert_eq!(resolve_term("2025-07-31T00:00:00Z"), "Summer 2025");
    }

    #[test]
    fn fall_starts_in_august() {
        assert_eq!(resolve_term("2025-08-01T00:00:00Z"), "Fall 2025");
        assert_eq!(resolve_term("2025-12-15T00:00:00Z"), "Fall 2025");
    }

    #[test]
    fn january_belongs_to_the_new_year() {
        assert_eq!(resolve_term("2026-01-05T00:00:00Z"), "Spring 2026");
    }

    #[test]
    fn empty_and_garbage_fall_back_to_default() {
        assert_eq!(resolve_term(""), DEFAULT_TERM);
        assert_eq!(resolve_term("not-a-date"), DEFAULT_TERM);
    }

    #[test]
    fn plain_dates_parse_too() {
        assert_eq!(resolve_term("2025-09-02"), "Fall 2025");
    }

    #[test]
    fn due_date_keeps_the_local_calendar_day() {
        // 23:59 UTC is still Aug 29 in campus time.
        assert_eq!(format_due_date("2025-08-29T23:59:00Z"), "2025-08-29");
        // 03:59 UTC on Aug 30 is 23:59 EDT on Aug 29.
        assert_eq!(format_due_date("2025-08-30T03:59:00Z"), "2025-08-29");
    }

    #[test]
    fn unparsable_due_date_is_empty() {
        assert_eq!(format_due_date("soon"), "");
        assert_eq!(format_due_date(""), "");
    }

    #[test]
    fn start_dates_format_as_plain_dates() {
        assert_eq!(format_calendar_date("2025-08-18T06:00:00Z"), "2025-08-18");
        assert_eq!(format_calendar_date("2025-08-18"), "2025-08-18");
        assert_eq!(format_calendar_date("nope"), "");
    }
}
