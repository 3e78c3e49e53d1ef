/// Format a second count as `HH:MM:SS`. Hours keep counting past 99.
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a fractional hour count, e.g. `1.5h`, `0.25h`, `3h`.
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{}h", text)
}

/// Truncate a string to a maximum length in characters, adding ellipsis if
/// needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(5), "00:00:05");
        assert_eq!(format_elapsed(3_725), "01:02:05");
        assert_eq!(format_elapsed(360_000), "100:00:00");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(1.5), "1.5h");
        assert_eq!(format_hours(0.25), "0.25h");
        assert_eq!(format_hours(3.0), "3h");
        assert_eq!(format_hours(0.004), "0h");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Pokémon Trainer", 8), "Pokém...");
    }
}
