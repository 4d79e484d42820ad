//! Human-readable dates for issue lists and notifications.

use chrono::{Local, NaiveDateTime};

/// Shown when the service sent no timestamp.
pub const MISSING_DATE: &str = "—";

/// `Oct 16, 2026, 09:21 AM`
pub fn format_date(date: Option<&NaiveDateTime>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => MISSING_DATE.to_string(),
    }
}

/// Relative age of `date`, falling back to the full date after a week.
pub fn time_ago(date: Option<&NaiveDateTime>) -> String {
    time_ago_from(date, &Local::now().naive_local())
}

/// [`time_ago`] against an explicit `now`.
pub fn time_ago_from(date: Option<&NaiveDateTime>, now: &NaiveDateTime) -> String {
    let Some(then) = date else {
        return String::new();
    };

    let elapsed = now.signed_duration_since(*then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        format_date(Some(then))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(&at(9, 21))), "Oct 16, 2026, 09:21 AM");
        assert_eq!(format_date(Some(&at(21, 5))), "Oct 16, 2026, 09:05 PM");
        assert_eq!(format_date(None), MISSING_DATE);
    }

    #[test]
    fn test_time_ago_buckets() {
        let then = at(9, 0);
        let ago = |d: Duration| time_ago_from(Some(&then), &(then + d));

        assert_eq!(ago(Duration::seconds(30)), "just now");
        assert_eq!(ago(Duration::minutes(5)), "5m ago");
        assert_eq!(ago(Duration::minutes(59)), "59m ago");
        assert_eq!(ago(Duration::hours(3)), "3h ago");
        assert_eq!(ago(Duration::days(2)), "2d ago");
        assert_eq!(ago(Duration::days(8)), "Oct 16, 2026, 09:00 AM");
    }

    #[test]
    fn test_time_ago_without_date() {
        assert_eq!(time_ago(None), "");
    }
}
