use std::time::Duration;

/// Formats a duration as `HH:MM:SS`; hours do not wrap at 24
pub fn format_elapsed(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(900)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "00:01:15");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 5)), "03:00:05");
        assert_eq!(format_elapsed(Duration::from_secs(30 * 3600)), "30:00:00");
    }
}
