use chrono::{DateTime, Utc};

/// Human-readable age of a timestamp relative to `now`.
///
/// Anything within the last minute (or in the future) is "Just now"; older
/// than a week falls back to a calendar date.
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();
    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => created_at.format("%b %-d, %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let cases = [
            (Duration::seconds(5), "Just now"),
            (Duration::seconds(-30), "Just now"),
            (Duration::minutes(7), "7m ago"),
            (Duration::hours(5), "5h ago"),
            (Duration::days(3), "3d ago"),
            (Duration::days(15), "Mar 5, 2024"),
        ];
        for (ago, expected) in cases {
            assert_eq!(relative_age(now - ago, now), expected);
        }
    }
}
