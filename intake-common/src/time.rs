//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Calendar date label used on progress records ("2024-11-04")
pub fn date_label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Hour and minute label used on chat messages ("14:05")
pub fn clock_label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_millis_to_duration_one_second() {
        let duration = millis_to_duration(1000);
        assert_eq!(duration, Duration::from_secs(1));
    }

    #[test]
    fn test_millis_to_duration_zero() {
        assert_eq!(millis_to_duration(0), Duration::ZERO);
    }

    #[test]
    fn test_date_label_is_iso_date() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 4, 9, 30, 0).unwrap();
        assert_eq!(date_label(ts), "2024-11-04");
    }

    #[test]
    fn test_clock_label_zero_pads() {
        let ts = Utc.with_ymd_and_hms(2024, 11, 4, 7, 5, 59).unwrap();
        assert_eq!(clock_label(ts), "07:05");
    }
}
