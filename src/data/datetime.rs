use chrono::NaiveDateTime;

/// Datetime formats accepted for the report's `start_datetime` field.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Parse a report timestamp, trying each accepted format in order.
/// Date-only values read as midnight. Returns `None` when nothing fits.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // RFC 3339 with timezone (e.g. "2024-03-07T14:02:11Z") loses its
    // offset; reports store naive local time.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
        if let Ok(d) = chrono::NaiveDate::parse_from_str(value, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_common_formats() {
        for s in [
            "2024-03-07 14:02:11",
            "2024-03-07T14:02:11",
            "03/07/2024 14:02:11",
            "2024-03-07T14:02:11.123Z",
        ] {
            let dt = parse_datetime(s).unwrap();
            assert_eq!(dt.date().month(), 3);
            assert_eq!(dt.time().hour(), 14);
        }
    }

    #[test]
    fn date_only_reads_as_midnight() {
        let dt = parse_datetime("2024-03-07").unwrap();
        assert_eq!(dt.time().num_seconds_from_midnight(), 0);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime("14:02:11"), None);
    }
}
