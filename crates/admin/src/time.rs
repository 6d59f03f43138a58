//! Relative-age formatting for dashboard listings.

use chrono::{DateTime, Utc};

/// Format how long ago something happened, dashboard-style.
///
/// Minute granularity below an hour, then hours, then days. Future
/// timestamps (clock skew between us and the backend) read as "Just now".
#[must_use]
pub fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(at).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }
    if minutes < 1440 {
        return format!("{} hours ago", minutes / 60);
    }
    format!("{} days ago", minutes / 1440)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_just_now() {
        assert_eq!(relative_age(at(10, 0), at(10, 0)), "Just now");
        // Future timestamp from clock skew
        assert_eq!(relative_age(at(10, 5), at(10, 0)), "Just now");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(relative_age(at(10, 0), at(10, 45)), "45 minutes ago");
    }

    #[test]
    fn test_hours() {
        assert_eq!(relative_age(at(7, 0), at(10, 30)), "3 hours ago");
    }

    #[test]
    fn test_days() {
        let two_days_ago = Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap();
        assert_eq!(relative_age(two_days_ago, at(10, 0)), "2 days ago");
    }
}
