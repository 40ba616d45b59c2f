use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Canonical on-disk format for due date-times. The fraction is only
/// written when non-zero.
pub const DUE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Canonical on-disk format for created dates
pub const CREATED_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts accepted on read, canonical first, then the
/// locale strings older lists were written with (`1/15/2025, 3:30:00 PM`).
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %I:%M %p",
    "%m/%d/%Y, %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Browsers put narrow/no-break spaces before the AM/PM marker.
fn normalize_spaces(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '\u{202f}' | '\u{a0}' => ' ',
            other => other,
        })
        .collect()
}

/// Parse a stored date-time string. Offsets are converted to local time;
/// a bare date means midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = normalize_spaces(s);
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, layout) {
            return Some(dt);
        }
    }

    parse_bare_date(&s).map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a stored created-date string. Full date-times are accepted and
/// truncated to their day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = normalize_spaces(s);
    parse_bare_date(&s).or_else(|| parse_datetime(&s).map(|dt| dt.date()))
}

fn parse_bare_date(s: &str) -> Option<NaiveDate> {
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(s, layout).ok())
}

/// Parse a due date typed by the user. A bare date means the end of that
/// day rather than midnight.
pub fn parse_due_input(s: &str) -> Result<NaiveDateTime, String> {
    let s = normalize_spaces(s);
    if let Some(day) = parse_bare_date(&s) {
        return day
            .and_hms_opt(23, 59, 0)
            .ok_or_else(|| format!("invalid due date: {}", s));
    }
    parse_datetime(&s).ok_or_else(|| {
        format!(
            "invalid due date '{}' (try \"2025-06-01 14:30\" or \"06/01/2025 2:30 PM\")",
            s
        )
    })
}

pub fn format_due(dt: &NaiveDateTime) -> String {
    dt.format(DUE_FORMAT).to_string()
}

pub fn format_created(d: &NaiveDate) -> String {
    d.format(CREATED_FORMAT).to_string()
}

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_canonical_format() {
        assert_eq!(
            parse_datetime("2025-01-15T15:30:00"),
            Some(dt(2025, 1, 15, 15, 30, 0))
        );
        assert_eq!(
            parse_datetime("2025-01-15T15:30:00.250"),
            Some(dt(2025, 1, 15, 15, 30, 0) + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn parses_legacy_locale_strings() {
        assert_eq!(
            parse_datetime("1/15/2025, 3:30:00 PM"),
            Some(dt(2025, 1, 15, 15, 30, 0))
        );
        assert_eq!(
            parse_datetime("12/01/2024, 9:05:10 AM"),
            Some(dt(2024, 12, 1, 9, 5, 10))
        );
        assert_eq!(
            parse_datetime("1/15/2025 3:30 PM"),
            Some(dt(2025, 1, 15, 15, 30, 0))
        );
    }

    #[test]
    fn parses_narrow_no_break_space_before_meridiem() {
        assert_eq!(
            parse_datetime("1/15/2025, 3:30:00\u{202f}PM"),
            Some(dt(2025, 1, 15, 15, 30, 0))
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_datetime("1/15/2025"), Some(dt(2025, 1, 15, 0, 0, 0)));
        assert_eq!(parse_datetime("2025-01-15"), Some(dt(2025, 1, 15, 0, 0, 0)));
    }

    #[test]
    fn rfc3339_is_converted_to_local() {
        let expected = Utc
            .with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_datetime("2025-01-15T12:00:00Z"), Some(expected));
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("tomorrow-ish"), None);
        assert_eq!(parse_datetime("13/45/2025"), None);
    }

    #[test]
    fn created_date_accepts_date_and_datetime() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date("1/15/2025"), Some(day));
        assert_eq!(parse_date("2025-01-15"), Some(day));
        assert_eq!(parse_date("2025-01-15T08:00:00"), Some(day));
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn user_due_bare_date_is_end_of_day() {
        assert_eq!(parse_due_input("2025-06-01"), Ok(dt(2025, 6, 1, 23, 59, 0)));
        assert_eq!(parse_due_input("2025-06-01 14:30"), Ok(dt(2025, 6, 1, 14, 30, 0)));
        assert_eq!(parse_due_input("06/01/2025 2:30 PM"), Ok(dt(2025, 6, 1, 14, 30, 0)));
        assert!(parse_due_input("next week").is_err());
    }

    #[test]
    fn format_is_canonical_and_reparses() {
        let due = dt(2025, 3, 9, 7, 5, 0);
        let text = format_due(&due);
        assert_eq!(text, "2025-03-09T07:05:00");
        assert_eq!(parse_datetime(&text), Some(due));
        assert_eq!(format_created(&due.date()), "2025-03-09");
    }
}
