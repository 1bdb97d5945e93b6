//! `Last-Modified` date formatting

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format a modification time as `Weekday, DD Month YYYY HH:MM:SS GMT`
///
/// Weekday and month are spelled out in full, day/hour/minute/second are
/// zero-padded to two digits.
pub fn format_last_modified(time: SystemTime) -> String {
    let utc: DateTime<Utc> = time.into();
    utc.format("%A, %d %B %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_format_known_timestamp() {
        let time = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        assert_eq!(
            format_last_modified(time),
            "Sunday, 09 September 2001 01:46:40 GMT"
        );
    }

    #[test]
    fn test_zero_padding() {
        let time = UNIX_EPOCH + Duration::from_secs(1_614_916_982);
        assert_eq!(format_last_modified(time), "Friday, 05 March 2021 04:03:02 GMT");
    }

    #[test]
    fn test_epoch() {
        assert_eq!(
            format_last_modified(UNIX_EPOCH),
            "Thursday, 01 January 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_subsecond_truncated() {
        let time = UNIX_EPOCH + Duration::from_millis(1_000_000_000_999);
        assert!(format_last_modified(time).ends_with("01:46:40 GMT"));
    }
}
