use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in dwell.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders a second count as `H hours M minutes S seconds`. No padding, no
/// upper bound on hours.
pub fn format_hms(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hrs} hours {mins} minutes {secs} seconds")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_key, format_hms};

    #[test]
    fn test_format_zero() {
        assert_eq!(format_hms(0), "0 hours 0 minutes 0 seconds");
    }

    #[test]
    fn test_format_under_a_minute() {
        assert_eq!(format_hms(59), "0 hours 0 minutes 59 seconds");
    }

    #[test]
    fn test_format_carries_into_every_unit() {
        assert_eq!(format_hms(3661), "1 hours 1 minutes 1 seconds");
    }

    #[test]
    fn test_format_hours_are_unbounded() {
        assert_eq!(format_hms(360_000), "100 hours 0 minutes 0 seconds");
    }

    #[test]
    fn test_date_key() {
        assert_eq!(
            date_key(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()),
            "2025-03-07"
        );
    }
}
