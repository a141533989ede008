use chrono::{DateTime, Local, TimeZone, Utc};

const MIB: u64 = 1024 * 1024;

pub fn format_size(bytes: u64) -> String {
    if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// `m:ss` countdown label.
pub fn format_time_left(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    format_time_in(timestamp, &Local)
}

pub fn format_time_in<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format("%H:%M").to_string()
}

/// Keeps the last `n` characters, the way ids are abbreviated in the sidebar.
pub fn tail(value: &str, n: usize) -> &str {
    let count = value.chars().count();
    if count <= n {
        return value;
    }
    let start = value
        .char_indices()
        .nth(count - n)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &value[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(MIB - 1), "1024.0 KB");
        assert_eq!(format_size(5 * MIB / 2), "2.5 MB");
    }

    #[test]
    fn time_left() {
        assert_eq!(format_time_left(0), "0:00");
        assert_eq!(format_time_left(65), "1:05");
        assert_eq!(format_time_left(180), "3:00");
    }

    #[test]
    fn clock_time() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T09:07:30Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_time_in(&ts, &Utc), "09:07");
    }

    #[test]
    fn tails() {
        assert_eq!(tail("session_123_abcdefgh", 8), "abcdefgh");
        assert_eq!(tail("short", 8), "short");
        assert_eq!(tail("héllo", 3), "llo");
    }
}
