use ratatui::style::{Color, Modifier, Style};

use questlog_core::models::Difficulty;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 192, 208);
pub const SECONDARY: Color = Color::Rgb(96, 176, 96);
pub const ACCENT: Color = Color::Rgb(232, 192, 64);
pub const ERROR: Color = Color::Rgb(208, 72, 72);
pub const MUTED: Color = Color::Rgb(128, 128, 140);
pub const HIGHLIGHT: Color = Color::Rgb(40, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Running-timer indicator
pub fn timer_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn completed_style() -> Style {
    Style::default()
        .fg(MUTED)
        .add_modifier(Modifier::CROSSED_OUT)
}

pub fn difficulty_style(difficulty: Difficulty) -> Style {
    let color = match difficulty {
        Difficulty::Easy => Color::Rgb(110, 200, 120),
        Difficulty::Medium => Color::Rgb(230, 200, 80),
        Difficulty::Hard => Color::Rgb(230, 100, 100),
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Terminal color for a goal's stored color class (e.g. `bg-blue-500`).
pub fn goal_color(class: &str) -> Color {
    match class.split('-').nth(1) {
        Some("orange") => Color::Rgb(240, 140, 50),
        Some("blue") => Color::Rgb(70, 130, 230),
        Some("purple") => Color::Rgb(160, 100, 220),
        Some("green") => Color::Rgb(80, 190, 100),
        Some("red") => Color::Rgb(220, 70, 70),
        _ => PRIMARY,
    }
}
