use chrono::{Datelike, NaiveDate, NaiveDateTime};

// ── Date parsing ──────────────────────────────────────────────────────────────

/// Calendar-date layouts accepted in source files and filter bounds.
///
/// `%Y` layouts only accept four-digit years (see [`FIRST_FOUR_DIGIT_YEAR`]);
/// short US dates fall through to the `%y` layouts, which map `24` to 2024.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%m-%d-%y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// chrono's `%Y` also matches one- and two-digit years; anything below this
/// came from a short year and is not taken as a `%Y` match.
const FIRST_FOUR_DIGIT_YEAR: i32 = 1000;

/// Date-time layouts whose date part is used.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parse a date cell into a calendar date.
///
/// Dates carry no timezone; a date-time value (ISO 8601, optionally with
/// offset) contributes only its date part. Returns `None` for empty strings or
/// unrecognised layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if has_full_year(fmt, date) {
                return Some(date);
            }
        }
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if has_full_year(fmt, dt.date()) {
                return Some(dt.date());
            }
        }
    }

    None
}

fn has_full_year(fmt: &str, date: NaiveDate) -> bool {
    !fmt.contains("%Y") || date.year() >= FIRST_FOUR_DIGIT_YEAR
}

// ── Ordering ──────────────────────────────────────────────────────────────────

/// Chronological sort key for a date cell.
///
/// Parseable dates order by calendar day; unparseable ones sort after every
/// parseable date.
pub fn date_sort_key(s: &str) -> (bool, Option<NaiveDate>) {
    let parsed = parse_date(s);
    (parsed.is_none(), parsed)
}

/// Stable in-place sort of `items` by the chronological key of `date_of`.
pub fn sort_by_date<T>(items: &mut [T], date_of: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| date_sort_key(date_of(item)));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_us_slash_date() {
        assert_eq!(parse_date("1/5/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_short_year_us_dates() {
        assert_eq!(parse_date("1/5/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("12/31/23"), Some(ymd(2023, 12, 31)));
        assert_eq!(parse_date("1-5-24"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_rejects_short_year_in_year_first_layouts() {
        assert_eq!(parse_date("24-01-05"), None);
        assert_eq!(parse_date("Jan 5, 24"), None);
        assert_eq!(parse_date("24-01-05 08:00:00"), None);
    }

    #[test]
    fn test_parse_month_name_date() {
        assert_eq!(parse_date("January 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_parse_datetime_uses_date_part() {
        assert_eq!(parse_date("2024-03-10T23:30:00Z"), Some(ymd(2024, 3, 10)));
        assert_eq!(parse_date("2024-03-10 08:15:00"), Some(ymd(2024, 3, 10)));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_date("  2024-02-01 "), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("N/A"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_sort_key_orders_unparseable_last() {
        assert!(date_sort_key("2024-01-01") < date_sort_key("N/A"));
        assert!(date_sort_key("12/31/2023") < date_sort_key("2024-01-01"));
    }

    #[test]
    fn test_sort_by_date_is_chronological_not_lexical() {
        // Lexically "10/01/2023" < "2/01/2023" but October comes later.
        let mut dates = vec!["10/01/2023", "bogus", "2/01/2023", "2023-06-15"];
        sort_by_date(&mut dates, |d| *d);
        assert_eq!(dates, vec!["2/01/2023", "2023-06-15", "10/01/2023", "bogus"]);
    }

    #[test]
    fn test_sort_by_date_short_years_sort_with_full_years() {
        let mut dates = vec!["1/6/24", "2024-01-05", "12/31/23"];
        sort_by_date(&mut dates, |d| *d);
        assert_eq!(dates, vec!["12/31/23", "2024-01-05", "1/6/24"]);
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let mut rows = vec![("2024-01-02", 'a'), ("2024-01-01", 'b'), ("2024-01-02", 'c')];
        sort_by_date(&mut rows, |r| r.0);
        assert_eq!(rows, vec![("2024-01-01", 'b'), ("2024-01-02", 'a'), ("2024-01-02", 'c')]);
    }
}
