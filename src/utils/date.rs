//! Publish date parsing and display formatting.
//!
//! Frontmatter dates are ISO-like `YYYY-MM-DD` strings. Anything that fails
//! to parse falls back to the Unix epoch sentinel, which sorts last when
//! listings are ordered most-recent-first.

use chrono::NaiveDate;

/// Parse an ISO-like `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a date, substituting the `1970-01-01` sentinel when the input is
/// missing or unparseable.
pub fn parse_date_or_sentinel(s: Option<&str>) -> NaiveDate {
    // NaiveDate::default() is the Unix epoch
    s.and_then(parse_date).unwrap_or_default()
}

/// Format a date in the long display form, e.g. `March 1, 2024`.
pub fn format_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_date_surrounding_whitespace() {
        assert_eq!(
            parse_date(" 2024-03-01 "),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_date_garbage() {
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_sentinel_is_epoch() {
        assert_eq!(
            parse_date_or_sentinel(None),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
        assert_eq!(
            parse_date_or_sentinel(Some("not a date")),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_format_long_unpadded_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(format_long(date), "March 1, 2024");
    }

    #[test]
    fn test_format_long_two_digit_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(format_long(date), "June 15, 2024");
    }
}
