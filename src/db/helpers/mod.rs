use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so that `ORDER BY created_at` sorts chronologically.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_text_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let text = format_datetime(&at);
        assert_eq!(text, "2024-03-09T07:05:01.000000Z");
        assert_eq!(parse_datetime(&text, "created_at").unwrap(), at);
    }

    #[test]
    fn test_formatted_datetimes_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_datetime(&earlier) < format_datetime(&later));
    }

    #[test]
    fn test_invalid_datetime_names_field() {
        let err = parse_datetime("yesterday", "created_at").unwrap_err();
        assert!(err.to_string().contains("created_at"));
    }
}
