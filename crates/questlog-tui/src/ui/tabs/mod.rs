pub mod achievements;
pub mod admin;
pub mod dashboard;
pub mod goals;
pub mod profile;
pub mod quests;

/// Fixed-width text bar for list rows, e.g. `████░░░░`.
pub(crate) fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(1.0, 4), "████");
        // Out-of-range ratios are clamped
        assert_eq!(progress_bar(3.0, 4), "████");
        assert_eq!(progress_bar(-1.0, 4), "░░░░");
    }
}
