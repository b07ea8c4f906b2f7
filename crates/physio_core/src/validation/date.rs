//! Birth date input parsing.

use chrono::{DateTime, NaiveDate};

/// Parses a form date as `YYYY-MM-DD` or an RFC 3339 date-time.
///
/// Date-times keep the calendar date of their own offset, which is the day
/// the user picked.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|value| value.date_naive())
}

#[cfg(test)]
mod tests {
    use super::parse_birth_date;
    use chrono::NaiveDate;

    #[test]
    fn parses_plain_dates_and_datetimes() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 10);
        assert_eq!(parse_birth_date("1990-05-10"), expected);
        assert_eq!(parse_birth_date("1990-05-10T23:30:00.000-03:00"), expected);
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_birth_date("  "), None);
        assert_eq!(parse_birth_date("10/05/1990"), None);
        assert_eq!(parse_birth_date("1990-02-30"), None);
    }
}
