//! Wall-clock arithmetic over "HH:MM" strings and countdown formatting.

/// Minutes in a day, used to wrap offsets that cross midnight.
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Add `offset_minutes` to an "HH:MM" start time, wrapping modulo 24 hours.
///
/// A malformed start time yields `"00:00"` rather than an error; callers treat
/// the value as display-only and a broken clock is preferable to aborting a
/// render pass.
pub fn minutes_to_time_str(start: &str, offset_minutes: i64) -> String {
    let Some(start_minutes) = parse_time_str(start) else {
        return "00:00".into();
    };

    let total = (start_minutes + offset_minutes).rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse an "HH:MM" string into minutes since midnight.
pub fn parse_time_str(value: &str) -> Option<i64> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: i64 = hours.trim().parse().ok()?;
    let minutes: i64 = minutes.trim().parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Format elapsed/remaining seconds as "MM:SS".
///
/// Negative or NaN input collapses to `"00:00"`. Minutes use floor division;
/// the leftover seconds are rounded.
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_nan() || seconds < 0.0 {
        return "00:00".into();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).round() as u64;
    format!("{minutes:02}:{secs:02}")
}

/// Format a long countdown as "HH:MM:SS".
///
/// Every level uses floor division so the display never overshoots zero.
pub fn format_countdown(seconds: f64) -> String {
    if seconds.is_nan() || seconds < 0.0 {
        return "00:00:00".into();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_anchored_at_the_start_time() {
        assert_eq!(minutes_to_time_str("09:00", 0), "09:00");
        assert_eq!(minutes_to_time_str("09:00", 15), "09:15");
        assert_eq!(minutes_to_time_str("09:00", 45), "09:45");
    }

    #[test]
    fn offsets_wrap_past_midnight() {
        assert_eq!(minutes_to_time_str("23:30", 45), "00:15");
        assert_eq!(minutes_to_time_str("00:10", -30), "23:40");
    }

    #[test]
    fn malformed_start_time_defaults_to_midnight() {
        assert_eq!(minutes_to_time_str("", 30), "00:00");
        assert_eq!(minutes_to_time_str("9am", 30), "00:00");
        assert_eq!(minutes_to_time_str("25:00", 30), "00:00");
        assert_eq!(minutes_to_time_str("10:75", 30), "00:00");
    }

    #[test]
    fn duration_formatting_matches_display_rules() {
        assert_eq!(format_duration(-5.0), "00:00");
        assert_eq!(format_duration(f64::NAN), "00:00");
        assert_eq!(format_duration(0.0), "00:00");
        assert_eq!(format_duration(125.0), "02:05");
        assert_eq!(format_duration(3599.0), "59:59");
    }

    #[test]
    fn countdown_formatting_floors_each_level() {
        assert_eq!(format_countdown(3661.0), "01:01:01");
        assert_eq!(format_countdown(59.9), "00:00:59");
        assert_eq!(format_countdown(-1.0), "00:00:00");
    }
}
