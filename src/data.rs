//! Cell-level parsing and formatting helpers shared by the pipeline and the
//! queries.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;

// Slash dates are read month-first; day-first only matches when the first
// field is above 12.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%b %d %Y", "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M",
    "%H:%M:%S%.f",
    "%I:%M %p",
    "%I:%M:%S %p",
    "%I:%M%p",
];

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| parse_naive_datetime(value).map(|dt| dt.date()))
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Hour of day for a time-of-day (or full datetime) string.
pub fn parse_time_hour(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
    {
        return Some(time.hour());
    }
    if let Some(hour) = parse_bare_meridiem_hour(value) {
        return Some(hour);
    }
    parse_naive_datetime(value).map(|dt| dt.hour())
}

// chrono cannot parse "%I %p" without minutes.
fn parse_bare_meridiem_hour(value: &str) -> Option<u32> {
    let (digits, meridiem) = value.split_once(' ')?;
    let hour: u32 = digits.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    match meridiem.to_ascii_lowercase().as_str() {
        "am" => Some(hour % 12),
        "pm" => Some(hour % 12 + 12),
        _ => None,
    }
}

fn leading_hour_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})(?::\d{2})?(?:$|\W)").expect("leading hour pattern is valid")
    })
}

/// Fallback hour extraction: the leading one or two digits, optionally
/// followed by `:MM`, and then end of text or a non-word character.
pub fn extract_leading_hour(value: &str) -> Option<u32> {
    let captures = leading_hour_pattern().captures(value)?;
    let hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    (hour < 24).then_some(hour)
}

/// Lenient numeric coercion. `NaN` and infinities are treated as missing.
pub fn parse_number(value: &str) -> Option<f64> {
    let parsed: f64 = value.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Two decimal places, used for report metrics.
pub fn format_fixed(value: f64) -> String {
    format!("{value:.2}")
}

/// Whole number with `,` thousands separators (rounded).
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Title-cases a string: the first letter of every run of alphabetic
/// characters is upper-cased and the rest lower-cased.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous_is_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_alpha {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            output.push(ch);
            previous_is_alpha = false;
        }
    }
    output
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    use chrono::{Datelike, Weekday};
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Median of the values (mean of the two middle values for even counts).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06"), Some(expected));
        assert_eq!(parse_naive_date("05/06/2024"), Some(expected));
        assert_eq!(parse_naive_date("25/12/2024"), NaiveDate::from_ymd_opt(2024, 12, 25));
        assert_eq!(parse_naive_date("2024/05/06"), Some(expected));
        assert_eq!(parse_naive_date("2024-05-06 13:45:00"), Some(expected));
        assert_eq!(parse_naive_date("yesterday"), None);
        assert_eq!(parse_naive_date(""), None);
    }

    #[test]
    fn ambiguous_slash_dates_are_month_first() {
        let march_fourth = NaiveDate::from_ymd_opt(2024, 3, 4);
        assert_eq!(parse_naive_date("03/04/2024"), march_fourth);
        assert_eq!(parse_naive_date("03/04/2024 10:00:00"), march_fourth);
        assert_eq!(parse_naive_date("12/25/2024"), NaiveDate::from_ymd_opt(2024, 12, 25));
    }

    #[test]
    fn parse_time_hour_reads_clock_strings() {
        assert_eq!(parse_time_hour("14:30"), Some(14));
        assert_eq!(parse_time_hour("07:05:59"), Some(7));
        assert_eq!(parse_time_hour("2:15 PM"), Some(14));
        assert_eq!(parse_time_hour("12 am"), Some(0));
        assert_eq!(parse_time_hour("2024-01-01 23:10:00"), Some(23));
        assert_eq!(parse_time_hour("14:30 IST"), None);
        assert_eq!(parse_time_hour("late"), None);
    }

    #[test]
    fn extract_leading_hour_requires_boundary_after_digits() {
        assert_eq!(extract_leading_hour("14:30 IST"), Some(14));
        assert_eq!(extract_leading_hour("9"), Some(9));
        assert_eq!(extract_leading_hour("09:15-ish"), Some(9));
        assert_eq!(extract_leading_hour("2pm-ish"), None);
        assert_eq!(extract_leading_hour("around 5"), None);
        assert_eq!(extract_leading_hour("99:00"), None);
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12km"), None);
    }

    #[test]
    fn format_number_drops_trailing_zero_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(4.25), "4.25");
        assert_eq!(format_thousands(1234567.4), "1,234,567");
        assert_eq!(format_thousands(-999.0), "-999");
    }

    #[test]
    fn title_case_capitalizes_each_alphabetic_run() {
        assert_eq!(title_case("no driver found"), "No Driver Found");
        assert_eq!(title_case("CANCELED"), "Canceled");
        assert_eq!(title_case("cancelled by-driver"), "Cancelled By-Driver");
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(median(&[10.0, 20.0, 40.0]), Some(20.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
